//! X.509 certificate inspection.
//!
//! Certificate files may be PEM (first `CERTIFICATE` block is used) or raw
//! DER. Only metadata is extracted; private keys are never read.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::public_key::PublicKey;
use x509_parser::x509::{AttributeTypeAndValue, X509Name};

use nginx_snapshot_core::{
    CertificateDates, CertificateMetadata, CertificateName, Result, SnapshotError,
};

use crate::hash::{colon_hex, sha256_raw};

pub const FINGERPRINT_ALGORITHM: &str = "SHA-256";

/// Read and decode the certificate at `path`.
pub fn inspect_certificate(path: &Path) -> Result<CertificateMetadata> {
    let stat_err = |e| SnapshotError::FileStat {
        path: path.to_path_buf(),
        source: e,
    };
    let meta = std::fs::metadata(path).map_err(stat_err)?;
    let bytes = std::fs::read(path).map_err(stat_err)?;

    let der = certificate_der(&bytes);
    let (_, cert) = x509_parser::parse_x509_certificate(&der).map_err(|e| {
        SnapshotError::CertificateDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let mtime: DateTime<Utc> = meta
        .modified()
        .map_or_else(|_| DateTime::<Utc>::UNIX_EPOCH, DateTime::from);

    debug!(path = %path.display(), subject = %cert.subject(), "inspected certificate");

    Ok(CertificateMetadata {
        file_name: path.display().to_string(),
        validity: CertificateDates {
            not_before: cert.validity().not_before.timestamp(),
            not_after: cert.validity().not_after.timestamp(),
        },
        issuer: name_of(cert.issuer()),
        subject: name_of(cert.subject()),
        size: meta.len(),
        mtime,
        subject_alt_names: subject_alt_names(&cert),
        public_key_algorithm: public_key_algorithm(&cert),
        signature_algorithm: signature_algorithm(&cert),
        serial_number: cert.serial.to_string(),
        subject_key_identifier: subject_key_identifier(&cert),
        authority_key_identifier: authority_key_identifier(&cert),
        fingerprint: colon_hex(&sha256_raw(&der)),
        fingerprint_algorithm: FINGERPRINT_ALGORITHM.to_string(),
        version: cert.version().0 + 1,
    })
}

/// DER bytes of the first PEM `CERTIFICATE` block, or the input unchanged.
fn certificate_der(bytes: &[u8]) -> Vec<u8> {
    match pem::parse_many(bytes) {
        Ok(blocks) => blocks
            .into_iter()
            .find(|p| p.tag() == "CERTIFICATE")
            .map_or_else(|| bytes.to_vec(), pem::Pem::into_contents),
        Err(_) => bytes.to_vec(),
    }
}

fn attribute_values<'s, 'a: 's>(
    attrs: impl Iterator<Item = &'s AttributeTypeAndValue<'a>>,
) -> Vec<String> {
    attrs
        .filter_map(|a| a.as_str().ok())
        .map(str::to_string)
        .collect()
}

fn name_of(name: &X509Name<'_>) -> CertificateName {
    CertificateName {
        common_name: attribute_values(name.iter_common_name()),
        country: attribute_values(name.iter_country()),
        locality: attribute_values(name.iter_locality()),
        organization: attribute_values(name.iter_organization()),
        organizational_unit: attribute_values(name.iter_organizational_unit()),
        state: attribute_values(name.iter_state_or_province()),
    }
}

fn subject_alt_names(cert: &X509Certificate<'_>) -> Vec<String> {
    let Ok(Some(san)) = cert.subject_alternative_name() else {
        return Vec::new();
    };
    san.value
        .general_names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some((*dns).to_string()),
            GeneralName::IPAddress(raw) => ip_string(raw),
            _ => None,
        })
        .collect()
}

fn ip_string(raw: &[u8]) -> Option<String> {
    match raw.len() {
        4 => {
            let octets: [u8; 4] = raw.try_into().ok()?;
            Some(std::net::Ipv4Addr::from(octets).to_string())
        }
        16 => {
            let octets: [u8; 16] = raw.try_into().ok()?;
            Some(std::net::Ipv6Addr::from(octets).to_string())
        }
        _ => None,
    }
}

fn public_key_algorithm(cert: &X509Certificate<'_>) -> String {
    match cert.public_key().parsed() {
        Ok(PublicKey::RSA(_)) => "RSA".into(),
        Ok(PublicKey::EC(_)) => "ECDSA".into(),
        Ok(PublicKey::DSA(_)) => "DSA".into(),
        _ => cert.public_key().algorithm.algorithm.to_id_string(),
    }
}

/// Conventional names for common signature OIDs.
const SIGNATURE_ALGORITHMS: &[(&str, &str)] = &[
    ("1.2.840.113549.1.1.4", "MD5-RSA"),
    ("1.2.840.113549.1.1.5", "SHA1-RSA"),
    ("1.2.840.113549.1.1.11", "SHA256-RSA"),
    ("1.2.840.113549.1.1.12", "SHA384-RSA"),
    ("1.2.840.113549.1.1.13", "SHA512-RSA"),
    ("1.2.840.113549.1.1.10", "SHA256-RSAPSS"),
    ("1.2.840.10040.4.3", "DSA-SHA1"),
    ("2.16.840.1.101.3.4.3.2", "DSA-SHA256"),
    ("1.2.840.10045.4.1", "ECDSA-SHA1"),
    ("1.2.840.10045.4.3.2", "ECDSA-SHA256"),
    ("1.2.840.10045.4.3.3", "ECDSA-SHA384"),
    ("1.2.840.10045.4.3.4", "ECDSA-SHA512"),
    ("1.3.101.112", "Ed25519"),
];

fn signature_algorithm(cert: &X509Certificate<'_>) -> String {
    let oid = cert.signature_algorithm.algorithm.to_id_string();
    SIGNATURE_ALGORITHMS
        .iter()
        .find(|(id, _)| *id == oid)
        .map_or(oid, |(_, name)| (*name).to_string())
}

fn subject_key_identifier(cert: &X509Certificate<'_>) -> String {
    cert.extensions()
        .iter()
        .find_map(|ext| match ext.parsed_extension() {
            ParsedExtension::SubjectKeyIdentifier(id) => Some(colon_hex(id.0)),
            _ => None,
        })
        .unwrap_or_default()
}

fn authority_key_identifier(cert: &X509Certificate<'_>) -> String {
    cert.extensions()
        .iter()
        .find_map(|ext| match ext.parsed_extension() {
            ParsedExtension::AuthorityKeyIdentifier(aki) => {
                aki.key_identifier.as_ref().map(|id| colon_hex(id.0))
            }
            _ => None,
        })
        .unwrap_or_default()
}
