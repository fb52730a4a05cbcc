//! Snapshot orchestration.
//!
//! ```text
//! parse ──> extract facts ──> primary archive + directory map
//!                        └──> certificates ──> auxiliary archive ──> ConfigSnapshot
//! ```
//!
//! Parse failures are fatal. A certificate that fails to decode is left
//! out of the certificate list; an auxiliary file that cannot be read is
//! left out of the archive. Neither aborts the build.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use nginx_snapshot_core::{
    AccessLog, ConfigDescriptor, ConfigSnapshot, ErrorLog, Result, SnapshotAction, SnapshotError,
};

use crate::allow::AllowedDirectories;
use crate::archive::{ArchiveEntry, ArchiveReader, ArchiveWriter};
use crate::assemble::AuxAssembler;
use crate::cert::inspect_certificate;
use crate::dirmap::DirectoryMapBuilder;
use crate::extract::{collect_facts, waf};
use crate::parser::{parse, ParseOptions};

/// Build a snapshot of the configuration rooted at `config_path` with
/// default parse options.
///
/// # Errors
///
/// Returns a fatal [`SnapshotError`] if the configuration cannot be read or
/// parsed, or an included file cannot be archived.
pub fn collect_snapshot(
    config_path: &Path,
    instance_id: &str,
    system_id: &str,
    allowed: &AllowedDirectories,
) -> Result<ConfigSnapshot> {
    collect_snapshot_with(
        config_path,
        instance_id,
        system_id,
        allowed,
        &ParseOptions::default(),
    )
}

/// [`collect_snapshot`] with explicit [`ParseOptions`].
pub fn collect_snapshot_with(
    config_path: &Path,
    instance_id: &str,
    system_id: &str,
    allowed: &AllowedDirectories,
    options: &ParseOptions,
) -> Result<ConfigSnapshot> {
    let payload = parse(config_path, options)?;
    let facts = collect_facts(&payload)?;

    let root_directory = payload
        .root()
        .and_then(|c| c.path.parent())
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

    let mut directory_map = DirectoryMapBuilder::new();
    let mut zconfig = ArchiveWriter::new(&root_directory);
    for file in payload.files() {
        zconfig.add_file(file)?;
        if let Err(e) = directory_map.record(file) {
            warn!(path = %file.display(), error = %e, "config file not recorded in directory map");
        }
    }

    let mut ssl_certificates = Vec::new();
    for path in &facts.certificates {
        match inspect_certificate(path) {
            Ok(meta) => ssl_certificates.push(meta),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping certificate"),
        }
    }

    let mut assembler = AuxAssembler::new(&root_directory, allowed, directory_map);
    for file in payload.files() {
        assembler.mark_seen(file);
    }
    assembler.process(&facts.aux);
    let aux_files = assembler.archived();
    let (directory_map, zaux) = assembler.finish()?;
    let zconfig = zconfig.finish()?;

    info!(
        config = %config_path.display(),
        files = payload.configs.len(),
        certificates = ssl_certificates.len(),
        aux_files,
        "snapshot complete"
    );

    Ok(ConfigSnapshot {
        action: SnapshotAction::Return,
        directory_map,
        access_logs: facts.access_logs,
        error_logs: facts.error_logs,
        ssl_certificates,
        config_data: ConfigDescriptor {
            instance_id: instance_id.to_string(),
            system_id: system_id.to_string(),
            checksum: String::new(),
        },
        zconfig,
        zaux,
    })
}

/// Error and access logs declared by the configuration at `config_path`.
pub fn error_and_access_logs(config_path: &Path) -> Result<(Vec<ErrorLog>, Vec<AccessLog>)> {
    let payload = parse(config_path, &ParseOptions::default())?;
    let facts = collect_facts(&payload)?;
    Ok((facts.error_logs, facts.access_logs))
}

/// Root configuration file of a snapshot: the first primary archive entry.
fn snapshot_root(snapshot: &ConfigSnapshot) -> Result<PathBuf> {
    ArchiveReader::new(&snapshot.zconfig)?
        .into_entries()
        .into_iter()
        .next()
        .map(|e| e.path)
        .ok_or_else(|| SnapshotError::Archive("primary archive is empty".into()))
}

/// Policy and security log profile base names for the configuration a
/// snapshot was taken from, in traversal order with duplicates.
///
/// The configuration is re-read from disk.
pub fn app_protect_files(snapshot: &ConfigSnapshot) -> Result<(Vec<String>, Vec<String>)> {
    let root = snapshot_root(snapshot)?;
    let payload = parse(&root, &ParseOptions::default())?;
    let (policies, profiles) = waf::waf_files(&payload)?;
    Ok((
        policies.iter().map(|p| waf::basename(p)).collect(),
        profiles.iter().map(|p| waf::basename(p)).collect(),
    ))
}

/// Add `file` to the auxiliary archive of an existing snapshot.
///
/// Returns `Ok(false)` when the file is not allow-listed, unreadable, or
/// already archived.
pub fn add_aux_file(
    snapshot: &mut ConfigSnapshot,
    file: &Path,
    allowed: &AllowedDirectories,
) -> Result<bool> {
    let root_directory = snapshot.zaux.as_ref().map_or_else(
        || snapshot.zconfig.root_directory.clone(),
        |z| z.root_directory.clone(),
    );
    let directory_map = DirectoryMapBuilder::from_map(snapshot.directory_map.clone());
    let mut assembler = AuxAssembler::new(root_directory, allowed, directory_map);

    for entry in ArchiveReader::new(&snapshot.zconfig)?.entries() {
        assembler.mark_seen(&entry.path);
    }
    if let Some(zaux) = &snapshot.zaux {
        for entry in ArchiveReader::new(zaux)?.into_entries() {
            assembler.preload(&entry.path, entry.mode, &entry.contents)?;
        }
    }

    let added = assembler.add(file);
    let (directory_map, zaux) = assembler.finish()?;
    snapshot.directory_map = directory_map;
    if added {
        debug!(path = %file.display(), "added auxiliary file");
        snapshot.zaux = zaux;
    }
    Ok(added)
}

/// Files recovered from a snapshot's archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackedSnapshot {
    /// Root configuration first, then included files
    pub config: Vec<ArchiveEntry>,
    pub aux: Vec<ArchiveEntry>,
}

/// Extract every file from a snapshot, verifying archive checksums.
pub fn unpack_snapshot(snapshot: &ConfigSnapshot) -> Result<UnpackedSnapshot> {
    let config = ArchiveReader::new(&snapshot.zconfig)?.into_entries();
    let aux = match &snapshot.zaux {
        Some(zaux) => ArchiveReader::new(zaux)?.into_entries(),
        None => Vec::new(),
    };
    Ok(UnpackedSnapshot { config, aux })
}
