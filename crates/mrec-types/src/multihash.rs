use std::fmt;

use crate::error::TypeError;
use crate::varint;

/// Multihash code for SHA2-256.
pub const SHA2_256: u64 = 0x12;
/// Multihash code for BLAKE3 (256-bit output).
pub const BLAKE3: u64 = 0x1e;

/// A self-describing digest: hash function code plus the raw digest bytes.
///
/// Binary form is `varint(code) ‖ varint(len) ‖ digest`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multihash {
    code: u64,
    digest: Vec<u8>,
}

impl Multihash {
    /// Wrap a digest produced by the hash function `code`.
    pub fn wrap(code: u64, digest: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            digest: digest.into(),
        }
    }

    /// The hash function code.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// The raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Append the binary form to `buf`.
    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        varint::write_uvarint(buf, self.code);
        varint::write_uvarint(buf, self.digest.len() as u64);
        buf.extend_from_slice(&self.digest);
    }

    /// Binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.digest.len() + 4);
        self.write_bytes(&mut buf);
        buf
    }

    /// Read one multihash from the front of `data`, returning it and the
    /// number of bytes consumed.
    pub fn read_bytes(data: &[u8]) -> Result<(Self, usize), TypeError> {
        let (code, n1) = varint::read_uvarint(data)?;
        let (len, n2) = varint::read_uvarint(&data[n1..])?;
        let start = n1 + n2;
        let len = usize::try_from(len).map_err(|_| TypeError::VarintOverflow)?;
        let available = data.len() - start;
        if available < len {
            return Err(TypeError::InvalidLength {
                expected: len,
                actual: available,
            });
        }
        let digest = data[start..start + len].to_vec();
        Ok((Self { code, digest }, start + len))
    }
}

impl fmt::Debug for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multihash(0x{:x}, {})", self.code, hex::encode(&self.digest))
    }
}
