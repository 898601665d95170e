use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::multihash::Multihash;
use crate::varint;

/// Multibase prefix for base58btc.
pub const BASE58BTC_PREFIX: char = 'z';

const CID_V1: u64 = 1;

/// Content identifier for a record block.
///
/// A `Cid` is a codec tag plus the multihash of the block's canonical bytes.
/// Identical bytes under the same codec always produce the same `Cid`; two
/// identifiers are equal exactly when their binary forms are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid {
    codec: u64,
    hash: Multihash,
}

impl Cid {
    /// Build a CIDv1 from a codec tag and a multihash.
    pub fn new_v1(codec: u64, hash: Multihash) -> Self {
        Self { codec, hash }
    }

    /// The codec tag naming the kind of content.
    pub fn codec(&self) -> u64 {
        self.codec
    }

    /// The multihash of the content.
    pub fn hash(&self) -> &Multihash {
        &self.hash
    }

    /// Binary form: `varint(1) ‖ varint(codec) ‖ multihash`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(40);
        varint::write_uvarint(&mut buf, CID_V1);
        varint::write_uvarint(&mut buf, self.codec);
        self.hash.write_bytes(&mut buf);
        buf
    }

    /// Read one CID from the front of `data`, returning it and the number of
    /// bytes consumed.
    pub fn read_bytes(data: &[u8]) -> Result<(Self, usize), TypeError> {
        let (version, n1) = varint::read_uvarint(data)?;
        if version != CID_V1 {
            return Err(TypeError::UnsupportedCidVersion(version));
        }
        let (codec, n2) = varint::read_uvarint(&data[n1..])?;
        let (hash, n3) = Multihash::read_bytes(&data[n1 + n2..])?;
        Ok((Self { codec, hash }, n1 + n2 + n3))
    }

    /// Parse a buffer that holds exactly one binary CID.
    pub fn try_from_bytes(data: &[u8]) -> Result<Self, TypeError> {
        let (cid, n) = Self::read_bytes(data)?;
        if n != data.len() {
            return Err(TypeError::TrailingBytes(data.len() - n));
        }
        Ok(cid)
    }

    /// Multibase base58btc string (`z` prefix).
    pub fn to_base58(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push(BASE58BTC_PREFIX);
        out.push_str(&bs58::encode(self.to_bytes()).into_string());
        out
    }

    /// Short form for logs: the last eight characters of the base58 string.
    pub fn short(&self) -> String {
        let full = self.to_base58();
        full[full.len().saturating_sub(8)..].to_string()
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid(0x{:x}, {})", self.codec, self.short())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(BASE58BTC_PREFIX)
            .ok_or_else(|| TypeError::InvalidMultibase(format!("expected 'z' prefix in {s:?}")))?;
        let bytes = bs58::decode(body)
            .into_vec()
            .map_err(|e| TypeError::InvalidMultibase(e.to_string()))?;
        Self::try_from_bytes(&bytes)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
