//! Field handlers.
//!
//! A [`Field`] owns one schema key: it narrows caller input into typed state,
//! writes the canonical form, parses it back, projects it to JSON, and
//! resolves graph paths through itself. Records are ordered lists of fields.
//!
//! Composite handlers ([`ArrayField`], [`ObjectField`]) never inspect input
//! types to decide what to build; they clone a prototype handler through
//! [`Field::prototype`] for every element.

use std::fmt;

use mrec_types::Cid;

use crate::error::{RecordError, RecordResult};
use crate::json::JsonMap;
use crate::record::Record;
use crate::value::{RawMap, Value};

mod array;
mod conditional;
mod context;
mod link;
mod number;
mod object;
mod text;
mod timestamp;

pub use array::ArrayField;
pub use conditional::ConditionalLinkField;
pub use context::{parse_version, ContextField, CONTEXT_KEY};
pub use link::LinkField;
pub use number::{Number, NumberField, NumberKind};
pub use object::ObjectField;
pub use text::StringField;
pub use timestamp::{TimestampField, TIMESTAMP_PATTERN};

/// Key used for the element prototype of an array.
pub const ELEMENT_KEY: &str = "_";

/// The capability set every field handler implements.
pub trait Field: fmt::Debug + Send + Sync {
    /// A blank handler with the same key and static configuration.
    fn prototype(&self) -> Box<dyn Field>;

    fn key(&self) -> &str;

    fn is_required(&self) -> bool;

    /// Accept a caller value, checking its shape and range, and write its
    /// decoded form under this handler's key. The written value is what
    /// [`Field::decode`] would produce for the same content.
    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()>;

    /// Check constraints that involve sibling fields. `siblings` holds the
    /// record's bound values in decoded form.
    fn validate(&self, siblings: &RawMap) -> RecordResult<()> {
        let _ = siblings;
        Ok(())
    }

    /// Write the canonical form under this handler's key. Fields that are
    /// conditionally absent write nothing.
    fn encode(&self, out: &mut RawMap) -> RecordResult<()>;

    /// Parse a canonical value and write its decoded form under this
    /// handler's key.
    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()>;

    /// Append the human-readable projection.
    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()>;

    /// Walk `path` through this field.
    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>>;

    /// Append the Merkle links reachable through this field. `prefix` is the
    /// path of this field's value.
    fn links(&self, prefix: &str, out: &mut Vec<Link>) {
        let _ = (prefix, out);
    }

    /// Append the paths below this field. `prefix` is the path of this
    /// field's value and is not itself appended.
    fn tree(&self, prefix: &str, out: &mut Vec<String>) {
        let _ = (prefix, out);
    }
}

/// Key and requiredness shared by every handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    key: String,
    required: bool,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, required: bool) -> Self {
        Self {
            key: key.into(),
            required,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A named Merkle link found inside a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Slash-separated path of the link inside the record.
    pub name: String,
    pub cid: Cid,
}

/// Outcome of path resolution.
#[derive(Debug)]
pub enum Resolved<'a> {
    /// The path named a whole record.
    Record(&'a Record),
    /// The path ended on a scalar.
    Value(Value),
    /// The path reached a link; `rest` must be resolved in the linked block.
    Link { cid: Cid, rest: Vec<String> },
    /// The path ended on an array.
    List(Vec<Resolved<'a>>),
}

impl Resolved<'_> {
    /// The link marker, if resolution stopped at a link.
    pub fn as_link(&self) -> Option<(&Cid, &[String])> {
        match self {
            Resolved::Link { cid, rest } => Some((cid, rest)),
            _ => None,
        }
    }

    /// Flatten into an owned interchange value. Links become `Value::Link`
    /// (any unresolved remainder is dropped) and records become their bound
    /// data plus custom fields.
    pub fn into_value(self) -> Value {
        match self {
            Resolved::Record(record) => record.to_value(),
            Resolved::Value(value) => value,
            Resolved::Link { cid, .. } => Value::Link(cid),
            Resolved::List(items) => {
                Value::Array(items.into_iter().map(Resolved::into_value).collect())
            }
        }
    }
}

/// Join a parent path and a segment.
pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}/{segment}")
    }
}

/// Reject a non-empty remainder on a terminal field.
pub(crate) fn ensure_terminal(key: &str, path: &[&str]) -> RecordResult<()> {
    match path.first() {
        None => Ok(()),
        Some(next) => Err(RecordError::PathResolution(format!(
            "unexpected path element {next:?} past \"{key}\""
        ))),
    }
}
