//! SHA-256 hashing via `ring::digest`.

use ring::digest::SHA256;

/// Compute SHA-256 of raw bytes.
#[must_use]
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(sha256_raw(data))
}

/// Raw SHA-256 digest bytes.
#[must_use]
pub fn sha256_raw(data: &[u8]) -> Vec<u8> {
    ring::digest::digest(&SHA256, data).as_ref().to_vec()
}

/// Render bytes as colon-separated uppercase hex pairs (`75:50:E2`).
#[must_use]
pub fn colon_hex(data: &[u8]) -> String {
    hex::encode_upper(data)
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}
