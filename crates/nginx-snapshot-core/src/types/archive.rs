use serde::{Deserialize, Serialize};

/// A finalized archive together with its checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZippedFile {
    /// Compressed archive bytes
    #[serde(with = "base64_bytes")]
    pub contents: Vec<u8>,

    /// Hex SHA-256 content digest
    pub checksum: String,

    /// Directory the archive was rooted at
    pub root_directory: String,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
