//! Content-addressed block storage for Merkle records.
//!
//! Every encoded record is an immutable block keyed by its [`Cid`](mrec_types::Cid).
//! Links inside one block name other blocks, so a store plus a
//! [`SchemaRegistry`](mrec_record::SchemaRegistry) is enough to walk a whole
//! record graph.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content addressing guarantees this).
//! 2. Raw writes are verified against their identifier before they land.
//! 3. The store never interprets block contents; [`DagWalker`] does that
//!    through the registry.

pub mod error;
pub mod memory;
pub mod traits;
pub mod walker;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
pub use walker::{DagWalker, Walked};
