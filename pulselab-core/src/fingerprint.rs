//! Configuration fingerprinting.
//!
//! The decision-log collaborator pairs every assessment with the exact
//! scoring profile that produced it. A blake3 hash over the canonical JSON
//! serialization gives a stable identity: struct field order is fixed, so
//! serde_json output is deterministic for a given profile.

use serde::{Deserialize, Serialize};

/// Hex-encoded blake3 hash of a serializable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        ConfigHash(blake3::hash(bytes).to_hex().to_string())
    }

    /// Hash any serializable value via its canonical JSON form.
    pub fn of<T: Serialize>(value: &T) -> Self {
        // Serialization of a plain struct cannot fail.
        let json = serde_json::to_string(value).expect("config must serialize");
        Self::from_bytes(json.as_bytes())
    }

    /// Short prefix for log lines and display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl std::fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
