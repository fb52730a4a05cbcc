//! SSL certificate metadata types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validity window of a certificate, in Unix epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDates {
    pub not_before: i64,
    pub not_after: i64,
}

impl CertificateDates {
    /// Whether `now` (epoch seconds) falls outside the window
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        now > self.not_after || now < self.not_before
    }
}

/// Distinguished-name components.
///
/// X.509 allows each attribute to repeat, so every component is a list kept
/// in certificate order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateName {
    #[serde(default)]
    pub common_name: Vec<String>,
    #[serde(default)]
    pub country: Vec<String>,
    #[serde(default)]
    pub locality: Vec<String>,
    #[serde(default)]
    pub organization: Vec<String>,
    #[serde(default)]
    pub organizational_unit: Vec<String>,
    #[serde(default)]
    pub state: Vec<String>,
}

/// Metadata for a certificate file referenced by the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateMetadata {
    /// Absolute path of the certificate file
    pub file_name: String,
    /// Not-before / not-after
    pub validity: CertificateDates,
    /// Issuer distinguished name
    pub issuer: CertificateName,
    /// Subject distinguished name
    pub subject: CertificateName,
    /// File size in bytes
    pub size: u64,
    /// File modification time
    pub mtime: DateTime<Utc>,
    /// DNS names and IP addresses from the SAN extension
    #[serde(default)]
    pub subject_alt_names: Vec<String>,
    /// e.g. `RSA`, `ECDSA`
    pub public_key_algorithm: String,
    /// e.g. `SHA256-RSA`, `ECDSA-SHA256`
    pub signature_algorithm: String,
    /// Serial number (decimal)
    pub serial_number: String,
    /// Colon-separated uppercase hex, empty when the extension is absent
    #[serde(default)]
    pub subject_key_identifier: String,
    /// Colon-separated uppercase hex, empty when the extension is absent
    #[serde(default)]
    pub authority_key_identifier: String,
    /// Digest of the DER encoding, colon-separated uppercase hex
    pub fingerprint: String,
    /// Digest used for `fingerprint`
    pub fingerprint_algorithm: String,
    /// X.509 version (1-3)
    pub version: u32,
}
