//! Snapshot data model.

mod archive;
mod cert;
mod directory;
mod logs;
mod snapshot;

pub use archive::ZippedFile;
pub use cert::{CertificateDates, CertificateMetadata, CertificateName};
pub use directory::{Directory, DirectoryMap, File};
pub use logs::{AccessLog, ErrorLog};
pub use snapshot::{ConfigDescriptor, ConfigSnapshot, SnapshotAction};
