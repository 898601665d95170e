//! Error types for the record engine.

use mrec_crypto::HasherError;
use mrec_types::TypeError;

use crate::field::NumberKind;

/// Errors raised while building, populating, encoding, decoding, or
/// traversing records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// No schema is registered under the requested kind name.
    #[error("\"{0}\" is not registered")]
    SchemaNotRegistered(String),

    /// The kind exists but has no constructor for this version.
    #[error("<{kind} (v{version})> is not implemented")]
    VersionNotImplemented { kind: String, version: u64 },

    /// A required schema field is absent from the input.
    #[error("the property \"{key}\" is required")]
    MissingRequiredField { key: String },

    /// A value has the wrong shape for its field.
    #[error("{key}: '{expected}' is expected but '{found}' is found")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A number does not fit the declared width or sign of its field.
    #[error("{key}: {value} is out of range for '{kind}'")]
    RangeError {
        key: String,
        kind: NumberKind,
        value: String,
    },

    /// A timestamp string is not in `YYYY-MM-DDTHH:MM:SS(Z|±HH:MM)` form.
    #[error("{key}: {value:?} must match pattern YYYY-MM-DDTHH:MM:SS(Z|±HH:MM)")]
    PatternMismatch { key: String, value: String },

    /// A link points at content of the wrong kind.
    #[error("{key}: codec 0x{expected:x} is expected but 0x{found:x} is found")]
    LinkCodecMismatch {
        key: String,
        expected: u64,
        found: u64,
    },

    /// Decoded bytes do not hash to the identifier the caller expected.
    #[error("CID \"{computed}\" is not matched: expected \"{expected}\"")]
    CidIntegrityMismatch { computed: String, expected: String },

    /// A field-level or schema-level invariant does not hold.
    #[error("{target}: {reason}")]
    ValidationFailed { target: String, reason: String },

    /// A path names an unknown key, an out-of-range index, or continues past
    /// a scalar.
    #[error("path resolution failed: {0}")]
    PathResolution(String),

    /// A path names an optional field that is absent.
    #[error("no such link: {0}")]
    NoSuchLink(String),

    /// The record was already populated.
    #[error("{0}: data already set")]
    AlreadyFinalized(String),

    /// An error raised by one element of an array field.
    #[error("{key} (index {index}): {source}")]
    Element {
        key: String,
        index: usize,
        #[source]
        source: Box<RecordError>,
    },

    /// A canonical value could not be decoded.
    #[error("{key}: malformed value: {reason}")]
    Malformed { key: String, reason: String },

    /// The canonical byte form could not be produced or parsed.
    #[error("canonical encoding error: {0}")]
    Canonical(String),

    /// Internal state contradicts the schema (a bug, not bad input).
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    /// A kind name or codec tag was registered twice.
    #[error("\"{0}\" is already registered")]
    AlreadyRegistered(String),

    /// A schema declares the same key twice.
    #[error("duplicate field \"{0}\" in schema")]
    DuplicateField(String),

    /// Raw input exceeds the configured block size.
    #[error("block of {size} bytes exceeds limit of {max}")]
    BlockTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Hasher(#[from] HasherError),
}

impl RecordError {
    /// The error with every array-element wrapper removed.
    pub fn root_cause(&self) -> &RecordError {
        let mut err = self;
        while let RecordError::Element { source, .. } = err {
            err = source.as_ref();
        }
        err
    }

    pub(crate) fn at_index(key: &str, index: usize, source: RecordError) -> Self {
        RecordError::Element {
            key: key.to_string(),
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn type_mismatch(key: &str, expected: &'static str, found: &'static str) -> Self {
        RecordError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }

    pub(crate) fn unset(key: &str) -> Self {
        RecordError::Invariant(format!("key {key:?} should exist"))
    }
}

/// Convenience alias for record results.
pub type RecordResult<T> = Result<T, RecordError>;
