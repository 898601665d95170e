use serde::{Deserialize, Serialize};

use mrec_crypto::HashAlgorithm;

/// Default upper bound on a block handed to `decode` (1 MiB).
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1 << 20;

/// Engine-wide settings owned by a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hash function for identifiers of newly encoded records.
    pub hash: HashAlgorithm,
    /// Largest raw block accepted by `decode`, in bytes.
    pub max_block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::Sha2_256,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.hash, HashAlgorithm::Sha2_256);
        assert_eq!(config.max_block_size, 1024 * 1024);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"hash": "blake3"}"#).unwrap();
        assert_eq!(config.hash, HashAlgorithm::Blake3);
        assert_eq!(config.max_block_size, DEFAULT_MAX_BLOCK_SIZE);
    }
}
