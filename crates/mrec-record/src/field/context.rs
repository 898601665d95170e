use crate::error::{RecordError, RecordResult};
use crate::field::{ensure_terminal, Field, Resolved};
use crate::json::JsonMap;
use crate::value::{RawMap, Value};

/// Key of the synthetic schema-version field present in every record.
pub const CONTEXT_KEY: &str = "context";

/// Synthetic field naming the schema a record was built with.
///
/// Encoded as the bare version number; projected to JSON as
/// `"schema/<kind>-v<version>"`. Callers never set it directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextField {
    kind: String,
    version: u64,
}

impl ContextField {
    pub fn new(kind: impl Into<String>, version: u64) -> Self {
        Self {
            kind: kind.into(),
            version,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The schema URL form, e.g. `schema/iscn-v1`.
    pub fn schema_url(&self) -> String {
        format!("schema/{}-v{}", self.kind, self.version)
    }

    fn check(&self, value: &Value) -> RecordResult<()> {
        let version = parse_version(value)?;
        if version != self.version {
            return Err(RecordError::ValidationFailed {
                target: CONTEXT_KEY.to_string(),
                reason: format!(
                    "version {version} does not match <{} (v{})>",
                    self.kind, self.version
                ),
            });
        }
        Ok(())
    }
}

/// Read a schema version from a canonical context value.
pub fn parse_version(value: &Value) -> RecordResult<u64> {
    match value {
        Value::Uint(0) => Err(RecordError::Malformed {
            key: CONTEXT_KEY.to_string(),
            reason: "schema version must be at least 1".to_string(),
        }),
        Value::Uint(v) => Ok(*v),
        other => Err(RecordError::type_mismatch(
            CONTEXT_KEY,
            "uint",
            other.type_name(),
        )),
    }
}

impl Field for ContextField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(self.clone())
    }

    fn key(&self) -> &str {
        CONTEXT_KEY
    }

    fn is_required(&self) -> bool {
        true
    }

    /// Only the version already bound at construction is accepted.
    fn set(&mut self, value: &Value, _out: &mut RawMap) -> RecordResult<()> {
        self.check(value)
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        out.insert(CONTEXT_KEY.to_string(), Value::Uint(self.version));
        Ok(())
    }

    /// Checks the encoded version. The context is metadata, so nothing is
    /// written to `out`.
    fn decode(&mut self, raw: &Value, _out: &mut RawMap) -> RecordResult<()> {
        self.check(raw)
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        out.insert(CONTEXT_KEY.to_string(), self.schema_url().into());
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        ensure_terminal(CONTEXT_KEY, path)?;
        Ok(Resolved::Value(Value::Text(self.schema_url())))
    }
}
