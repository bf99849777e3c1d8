use serde::{Deserialize, Serialize};

/// Where a completed buffer was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Download,
    Webhook,
}

/// One completed dispatch, as remembered by the session ledger.
///
/// Serializable for JSON export of the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: String,
    pub name: String,
    pub created_at: String,

    /// Duration in seconds for audio, row count for tables.
    pub quantity: f64,

    pub size_bytes: u64,
    pub destination: Destination,
    pub checksum: String,
}

impl UploadRecord {
    pub fn new(
        name: &str,
        quantity: f64,
        size_bytes: u64,
        destination: Destination,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            quantity,
            size_bytes,
            destination,
            checksum: checksum.to_string(),
        }
    }
}

/// Compute the SHA-256 hex digest of a dispatched buffer.
pub fn buffer_checksum(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
