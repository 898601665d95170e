use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use mrec_types::multihash::{self, Multihash};
use mrec_types::Cid;

/// Hash functions a record identifier may be computed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha2-256")]
    Sha2_256,
    Blake3,
}

impl HashAlgorithm {
    /// The multihash code for this function.
    pub fn code(&self) -> u64 {
        match self {
            Self::Sha2_256 => multihash::SHA2_256,
            Self::Blake3 => multihash::BLAKE3,
        }
    }

    /// Look up a function by multihash code.
    pub fn from_code(code: u64) -> Result<Self, HasherError> {
        match code {
            multihash::SHA2_256 => Ok(Self::Sha2_256),
            multihash::BLAKE3 => Ok(Self::Blake3),
            other => Err(HasherError::UnsupportedHash(other)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha2_256 => write!(f, "sha2-256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Multihash content hasher.
///
/// Each hasher is bound to one [`HashAlgorithm`]. The codec tag is supplied
/// per call because one hasher serves every record kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
}

impl ContentHasher {
    /// SHA2-256 hasher (the default).
    pub const SHA2_256: Self = Self {
        algorithm: HashAlgorithm::Sha2_256,
    };
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: HashAlgorithm::Blake3,
    };

    /// Create a hasher for the given algorithm.
    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The hasher that produced `cid`.
    pub fn for_cid(cid: &Cid) -> Result<Self, HasherError> {
        HashAlgorithm::from_code(cid.hash().code()).map(Self::new)
    }

    /// The algorithm this hasher uses.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Multihash of raw bytes.
    pub fn hash(&self, data: &[u8]) -> Multihash {
        let digest: Vec<u8> = match self.algorithm {
            HashAlgorithm::Sha2_256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        };
        Multihash::wrap(self.algorithm.code(), digest)
    }

    /// CIDv1 of raw bytes under `codec`.
    pub fn cid(&self, codec: u64, data: &[u8]) -> Cid {
        Cid::new_v1(codec, self.hash(data))
    }

    /// Verify that data produces the expected identifier.
    ///
    /// Uses this hasher's algorithm; a `cid` made with a different function
    /// never verifies.
    pub fn verify(&self, data: &[u8], expected: &Cid) -> bool {
        self.cid(expected.codec(), data) == *expected
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::SHA2_256
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("unsupported multihash code 0x{0:x}")]
    UnsupportedHash(u64),
}
