//! End-to-end snapshot tests against a generated configuration tree.

use std::fs;
use std::path::{Path, PathBuf};

use nginx_snapshot::extract::endpoints::collect_endpoints;
use nginx_snapshot::{
    app_protect_files, collect_snapshot, collect_snapshot_with, error_and_access_logs, parse,
    unpack_snapshot, AllowedDirectories, ArchiveReader, ParseOptions, SnapshotError,
};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    base: PathBuf,
}

impl Fixture {
    fn path(&self, rel: &str) -> PathBuf {
        self.base.join(rel)
    }

    fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn conf(&self) -> PathBuf {
        self.path("nginx/nginx.conf")
    }

    fn allowed(&self) -> AllowedDirectories {
        AllowedDirectories::new([self.path("nginx/"), self.path("root")])
    }
}

fn certificate_pem(name: &str) -> String {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::new(vec![name.to_string()]).unwrap();
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CommonName, name);
    params.self_signed(&key).unwrap().pem()
}

/// A configuration with includes, logs, certificates inside and outside the
/// allow-list, WAF files declared twice, and nested `root` directives.
fn full_fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let fx = Fixture {
        base: tmp.path().to_path_buf(),
        _tmp: tmp,
    };
    let b = fx.base.display();

    fx.write("logs/access.log", "");
    fx.write("logs/error.log", "");
    fx.write("nginx/ca.crt", certificate_pem("ca.example.com"));
    fx.write("outside/out.crt", certificate_pem("out.example.com"));
    fx.write("root/test.html", "<h1>hello</h1>");
    fx.write("root/my-nap-policy.json", "{\"policy\": {}}");
    fx.write("root/log-default.json", "{\"filter\": {}}");
    fx.write("root/static/app.js", "console.log(1);");
    fx.write("nginx/mime.types", "types { text/html html; }\n");
    fx.write(
        "nginx/conf.d/site.conf",
        format!(
            "server {{\n\
             \x20   listen 127.0.0.1:80;\n\
             \x20   root {b}/root;\n\
             \x20   app_protect_policy_file {b}/root/my-nap-policy.json;\n\
             \x20   app_protect_security_log {b}/root/log-default.json syslog:server=127.0.0.1:514;\n\
             \x20   location /api {{ api write=on; }}\n\
             \x20   location /static {{ root {b}/root/static; }}\n\
             }}\n"
        ),
    );
    fx.write(
        "nginx/nginx.conf",
        format!(
            "user nginx;\n\
             error_log {b}/logs/error.log warn;\n\
             events {{ worker_connections 1024; }}\n\
             http {{\n\
             \x20   include mime.types;\n\
             \x20   access_log {b}/logs/access.log combined;\n\
             \x20   ssl_certificate ca.crt;\n\
             \x20   ssl_certificate_key ca.key;\n\
             \x20   ssl_trusted_certificate {b}/outside/out.crt;\n\
             \x20   app_protect_policy_file {b}/root/my-nap-policy.json;\n\
             \x20   include conf.d/*.conf;\n\
             }}\n"
        ),
    );
    fx
}

fn dir_key(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn single_file_config_is_archived_verbatim() {
    let tmp = TempDir::new().unwrap();
    let conf = tmp.path().join("nginx.conf");
    let text = "worker_processes auto;\nevents {\n    worker_connections 512;\n}\n";
    fs::write(&conf, text).unwrap();

    let snapshot = collect_snapshot(&conf, "i", "s", &AllowedDirectories::default()).unwrap();
    let reader = ArchiveReader::new(&snapshot.zconfig).unwrap();
    assert_eq!(reader.entries().len(), 1);
    assert_eq!(reader.entries()[0].path, conf);
    assert_eq!(reader.entries()[0].contents, text.as_bytes());
    assert!(snapshot.zaux.is_none());
}

#[test]
fn logs_are_reported() {
    let fx = full_fixture();
    let snapshot = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();

    assert_eq!(snapshot.access_logs.len(), 1);
    assert_eq!(snapshot.access_logs[0].name, dir_key(&fx.path("logs/access.log")));
    assert_eq!(snapshot.access_logs[0].format, "combined");
    assert!(snapshot.access_logs[0].readable);

    assert_eq!(snapshot.error_logs.len(), 1);
    assert_eq!(snapshot.error_logs[0].name, dir_key(&fx.path("logs/error.log")));
    assert_eq!(snapshot.error_logs[0].log_level, "warn");

    let (errors, access) = error_and_access_logs(&fx.conf()).unwrap();
    assert_eq!(errors, snapshot.error_logs);
    assert_eq!(access, snapshot.access_logs);
}

#[test]
fn primary_archive_holds_config_tree() {
    let fx = full_fixture();
    let snapshot = collect_snapshot(&fx.conf(), "i", "s", &AllowedDirectories::default()).unwrap();

    let unpacked = unpack_snapshot(&snapshot).unwrap();
    let paths: Vec<_> = unpacked.config.iter().map(|e| e.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            fx.conf(),
            fx.path("nginx/mime.types"),
            fx.path("nginx/conf.d/site.conf"),
        ]
    );
    for entry in &unpacked.config {
        assert_eq!(entry.contents, fs::read(&entry.path).unwrap());
    }
    assert_eq!(snapshot.zconfig.root_directory, dir_key(&fx.path("nginx")));
}

#[test]
fn auxiliary_archive_respects_allow_list_and_dedups() {
    let fx = full_fixture();
    let snapshot = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();

    let aux = ArchiveReader::new(snapshot.zaux.as_ref().unwrap()).unwrap();
    let paths: Vec<_> = aux.entries().iter().map(|e| e.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            fx.path("nginx/ca.crt"),
            fx.path("root/my-nap-policy.json"),
            fx.path("root/log-default.json"),
            fx.path("root/static/app.js"),
            fx.path("root/test.html"),
        ]
    );
    assert!(aux.get(&fx.path("outside/out.crt")).is_none());

    // reported even though not archived
    let certs: Vec<_> = snapshot.ssl_certificates.iter().map(|c| c.file_name.clone()).collect();
    assert_eq!(
        certs,
        vec![dir_key(&fx.path("nginx/ca.crt")), dir_key(&fx.path("outside/out.crt"))]
    );
    assert_eq!(snapshot.ssl_certificates[1].subject.common_name, vec!["out.example.com"]);
}

#[test]
fn directory_map_is_ordered_and_unique() {
    let fx = full_fixture();
    let snapshot = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();
    let map = &snapshot.directory_map;

    let dirs: Vec<_> = map.directories.iter().map(|d| d.name.clone()).collect();
    assert_eq!(
        dirs,
        vec![
            dir_key(&fx.path("nginx")),
            dir_key(&fx.path("nginx/conf.d")),
            dir_key(&fx.path("root")),
            dir_key(&fx.path("root/static")),
        ]
    );

    let nginx: Vec<_> = map.directories[0].files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(nginx, vec!["nginx.conf", "mime.types", "ca.crt"]);
    let root: Vec<_> = map.directories[2].files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(root, vec!["my-nap-policy.json", "log-default.json", "test.html"]);

    for dir in &map.directories {
        let mut names: Vec<_> = dir.files.iter().map(|f| &f.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate basename in {}", dir.name);
    }
    assert!(map.get(&dir_key(&fx.path("outside"))).is_none());
}

#[test]
fn waf_files_keep_duplicates() {
    let fx = full_fixture();
    let snapshot = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();

    let (policies, profiles) = app_protect_files(&snapshot).unwrap();
    assert_eq!(policies, vec!["my-nap-policy.json", "my-nap-policy.json"]);
    assert_eq!(profiles, vec!["log-default.json"]);
}

#[test]
fn plus_endpoint_is_discovered() {
    let fx = full_fixture();
    let payload = parse(&fx.conf(), &ParseOptions::default()).unwrap();
    let endpoints = collect_endpoints(&payload).unwrap();
    assert_eq!(endpoints.plus, vec!["http://127.0.0.1:80/api"]);
    assert!(endpoints.oss.is_empty());
}

#[test]
fn rerun_is_deterministic() {
    let fx = full_fixture();
    let first = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();
    let second = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn snapshot_round_trips_through_json() {
    let fx = full_fixture();
    let snapshot = collect_snapshot(&fx.conf(), "i", "s", &fx.allowed()).unwrap();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: nginx_snapshot::ConfigSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
    assert!(unpack_snapshot(&parsed).is_ok());
}

#[test]
fn missing_include_strict_and_lenient() {
    let tmp = TempDir::new().unwrap();
    let conf = tmp.path().join("nginx.conf");
    fs::write(&conf, "events {}\nhttp {\n    include missing.conf;\n}\n").unwrap();
    let allowed = AllowedDirectories::default();

    let err = collect_snapshot(&conf, "i", "s", &allowed).unwrap_err();
    assert!(matches!(err, SnapshotError::MissingInclude { line: 3, .. }));
    assert!(err.is_fatal());

    let snapshot =
        collect_snapshot_with(&conf, "i", "s", &allowed, &ParseOptions::lenient()).unwrap();
    assert_eq!(unpack_snapshot(&snapshot).unwrap().config.len(), 1);
}

#[test]
fn unreadable_root_is_fatal() {
    let err = collect_snapshot(
        Path::new("/nonexistent/nginx.conf"),
        "i",
        "s",
        &AllowedDirectories::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SnapshotError::ConfigRead { .. }));
}

#[test]
fn broken_certificate_is_omitted() {
    let tmp = TempDir::new().unwrap();
    let conf = tmp.path().join("nginx.conf");
    fs::write(tmp.path().join("bad.crt"), "garbage").unwrap();
    fs::write(&conf, "http { ssl_certificate bad.crt; }\n").unwrap();

    let allowed = AllowedDirectories::new([tmp.path()]);
    let snapshot = collect_snapshot(&conf, "i", "s", &allowed).unwrap();
    assert!(snapshot.ssl_certificates.is_empty());
    // still archived: the allow-list decides membership, not decodability
    let aux = ArchiveReader::new(snapshot.zaux.as_ref().unwrap()).unwrap();
    assert!(aux.get(&tmp.path().join("bad.crt")).is_some());
}

#[test]
fn symlinks_cannot_smuggle_files_into_aux_archive() {
    let tmp = TempDir::new().unwrap();
    let nginx = tmp.path().join("nginx");
    let secret = tmp.path().join("secret");
    fs::create_dir_all(&nginx).unwrap();
    fs::create_dir_all(&secret).unwrap();
    fs::write(secret.join("shadow"), "TOPSECRET").unwrap();
    std::os::unix::fs::symlink(secret.join("shadow"), nginx.join("site.crt")).unwrap();
    std::os::unix::fs::symlink(&secret, nginx.join("html")).unwrap();
    let conf = nginx.join("nginx.conf");
    fs::write(&conf, "http { ssl_certificate site.crt; root html; }\n").unwrap();

    let snapshot = collect_snapshot(&conf, "i", "s", &AllowedDirectories::new([&nginx])).unwrap();
    assert!(snapshot.zaux.is_none(), "nothing under nginx/ resolves inside it");
    assert!(snapshot.directory_map.get(&dir_key(&nginx.join("html"))).is_none());
}
