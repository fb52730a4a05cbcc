//! Configuration snapshot -- everything sent to the control plane.

use serde::{Deserialize, Serialize};

use super::archive::ZippedFile;
use super::cert::CertificateMetadata;
use super::directory::DirectoryMap;
use super::logs::{AccessLog, ErrorLog};

/// What the receiver should do with the snapshot.
///
/// Only `Return` is produced here; the field exists for compatibility with
/// push/pull exchanges that carry other actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotAction {
    #[default]
    Return,
}

/// Identity of the instance a snapshot belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDescriptor {
    /// Opaque instance identifier, passed through verbatim
    pub instance_id: String,
    /// Opaque system identifier, passed through verbatim
    pub system_id: String,
    /// Left empty; filled in by the receiver
    #[serde(default)]
    pub checksum: String,
}

/// A self-contained snapshot of one NGINX configuration tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub action: SnapshotAction,
    /// Directories holding the configuration and archived auxiliary files
    pub directory_map: DirectoryMap,
    pub access_logs: Vec<AccessLog>,
    pub error_logs: Vec<ErrorLog>,
    pub ssl_certificates: Vec<CertificateMetadata>,
    pub config_data: ConfigDescriptor,
    /// Root configuration file plus everything it includes
    pub zconfig: ZippedFile,
    /// Allow-listed referenced files; `None` when nothing qualified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zaux: Option<ZippedFile>,
}

impl ConfigSnapshot {
    /// Number of expired certificates at `now` (epoch seconds)
    #[must_use]
    pub fn expired_certificates(&self, now: i64) -> usize {
        self.ssl_certificates
            .iter()
            .filter(|c| c.validity.is_expired_at(now))
            .count()
    }
}
