//! Schema-driven Merkle records.
//!
//! A record is a versioned, schema-bound map whose canonical CBOR bytes hash
//! to its content identifier. This crate provides the pieces that make one:
//!
//! - [`field`] — Field handlers, one per schema key (numbers, strings,
//!   timestamps, links, conditional links, arrays, nested records)
//! - [`Record`] — Ordered composition of handlers with required/optional
//!   enforcement, custom-key passthrough, validation, and path resolution
//! - [`SchemaRegistry`] — Kind name → versioned constructors, plus the
//!   verified `encode`/`decode` entry points
//! - [`json`] — Ordered, link-aware JSON projection
//!
//! # Example
//!
//! ```
//! use mrec_record::field::{Field, StringField};
//! use mrec_record::{RawMap, Record, RecordResult, SchemaRegistry, Value};
//!
//! fn note_v1() -> RecordResult<Record> {
//!     Record::new(0x0300, "note", 1, vec![
//!         Box::new(StringField::new("title", true)) as Box<dyn Field>,
//!     ])
//! }
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register("note", 0x0300, vec![note_v1 as mrec_record::Constructor])?;
//!
//! let mut data = RawMap::new();
//! data.insert("title".into(), Value::from("hello"));
//! let record = registry.encode("note", 1, data)?;
//! let cid = record.cid().unwrap().clone();
//!
//! let back = registry.decode("note", record.raw_data().unwrap(), &cid)?;
//! assert_eq!(back.get_str("title")?, "hello");
//! # Ok::<(), mrec_record::RecordError>(())
//! ```

pub mod canonical;
pub mod config;
pub mod error;
pub mod field;
pub mod json;
pub mod record;
pub mod registry;
pub mod value;

pub use config::EngineConfig;
pub use error::{RecordError, RecordResult};
pub use field::{Field, Link, Resolved};
pub use record::{Constructor, Record, Validator};
pub use registry::{KindInfo, SchemaRegistry};
pub use value::{RawMap, Value};
