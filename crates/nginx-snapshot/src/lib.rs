//! # nginx-snapshot
//!
//! Turns a live NGINX configuration tree into a self-contained,
//! checksummed snapshot for a management control plane.
//!
//! ## Data Flow
//!
//! ```text
//! Phase 1: Parse
//!   parse() root file + every include -> Payload
//!
//! Phase 2: Extract (one traversal)
//!   FactCollector -> access/error logs, certificate paths, WAF files,
//!                    status endpoints, root directories
//!
//! Phase 3: Assemble
//!   primary archive    <- root config + included files (always)
//!   auxiliary archive  <- certificates, WAF files, files under `root`
//!                         (allow-listed only, each path once)
//!   directory map      <- every archived file
//!
//! Phase 4: Finalize
//!   -> ConfigSnapshot { facts, directory map, zconfig, zaux? }
//! ```
//!
//! Reported facts are never filtered by the allow-list; only archive
//! membership is.
//!
//! ## Example
//!
//! ```no_run
//! use nginx_snapshot::{collect_snapshot, AllowedDirectories};
//! use std::path::Path;
//!
//! let allowed = AllowedDirectories::new(["/etc/nginx"]);
//! let snapshot = collect_snapshot(Path::new("/etc/nginx/nginx.conf"), "instance", "system", &allowed)?;
//! println!("{} certificates", snapshot.ssl_certificates.len());
//! # Ok::<(), nginx_snapshot::SnapshotError>(())
//! ```

pub mod allow;
pub mod archive;
pub mod assemble;
pub mod cert;
pub mod config;
pub mod directive;
pub mod dirmap;
pub mod extract;
pub mod hash;
pub mod parser;
pub mod paths;
pub mod probe;
pub mod snapshot;
pub mod traverse;

pub use nginx_snapshot_core::*;

pub use allow::AllowedDirectories;
pub use archive::{ArchiveEntry, ArchiveReader, ArchiveWriter};
pub use cert::inspect_certificate;
pub use config::SnapshotConfig;
pub use directive::{ConfigFile, Directive, Payload};
pub use extract::logs::{access_log_paths, error_log_paths};
pub use extract::{collect_facts, AuxReference, Facts, StatusEndpoints};
pub use parser::{parse, parse_str, ParseOptions};
pub use probe::{status_api_info, EndpointKind, StatusEndpoint, StatusProbe};
pub use snapshot::{
    add_aux_file, app_protect_files, collect_snapshot, collect_snapshot_with,
    error_and_access_logs, unpack_snapshot, UnpackedSnapshot,
};
pub use traverse::{traverse, traverse_directives};
