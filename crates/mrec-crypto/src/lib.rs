//! Content hashing for Merkle records.
//!
//! Turns canonical record bytes into a multihash and a [`Cid`](mrec_types::Cid).
//! SHA2-256 is the default function; BLAKE3 is available for deployments
//! that prefer it. All crypto operations wrap established libraries — no
//! custom cryptography.

pub mod hasher;

pub use hasher::{ContentHasher, HashAlgorithm, HasherError};
