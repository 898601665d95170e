//! Foundation types for Merkle records.
//!
//! This crate provides the identity and wire-level primitives every other
//! `mrec` crate builds on.
//!
//! # Key Types
//!
//! - [`Cid`] — Self-describing content identifier (CIDv1: codec tag + multihash)
//! - [`Multihash`] — Hash function code paired with its digest
//! - [`varint`] — Unsigned LEB128 and zig-zag signed variable-length integers
//! - [`codec`] — Multicodec tags for every record kind

pub mod cid;
pub mod codec;
pub mod error;
pub mod multihash;
pub mod varint;

pub use cid::Cid;
pub use error::TypeError;
pub use multihash::Multihash;
