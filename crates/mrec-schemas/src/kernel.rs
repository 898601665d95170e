//! ISCN kernel: the top-level record tying a work's content, rights, and
//! stakeholders together under a stable identifier.

use mrec_record::error::RecordError;
use mrec_record::field::{
    ConditionalLinkField, Field, LinkField, NumberField, NumberKind, Resolved, TimestampField,
};
use mrec_record::json::JsonMap;
use mrec_record::{Constructor, RawMap, Record, RecordResult, SchemaRegistry, Value};
use mrec_types::codec;

pub const NAME: &str = "iscn";

/// Length of a kernel identifier in bytes.
pub const ID_LEN: usize = 32;

const ID_KEY: &str = "id";
const ID_SCHEME: &str = "1/";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::ISCN, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Record::new(
        codec::ISCN,
        NAME,
        1,
        vec![
            Box::new(IdField::new()) as Box<dyn Field>,
            Box::new(TimestampField::new("timestamp", true)),
            Box::new(NumberField::new("version", true, NumberKind::Uint64)),
            Box::new(ConditionalLinkField::new("parent", codec::ISCN, "version")),
            Box::new(LinkField::new("rights", true, codec::RIGHTS)),
            Box::new(LinkField::new("stakeholders", true, codec::STAKEHOLDERS)),
            Box::new(LinkField::new("content", true, codec::CONTENT)),
        ],
    )
}

/// The 32-byte kernel identifier. Shown to humans as `1/<base58>`.
#[derive(Clone, Debug, Default)]
pub struct IdField {
    id: Option<Vec<u8>>,
}

impl IdField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Human-readable form, e.g. `1/4vJ9...`.
    pub fn display_id(&self) -> Option<String> {
        self.id
            .as_ref()
            .map(|id| format!("{ID_SCHEME}{}", bs58::encode(id).into_string()))
    }

    /// Accept raw bytes, or the `1/<base58>` form from JSON input.
    fn parse(value: &Value) -> RecordResult<Vec<u8>> {
        let id = match value {
            Value::Bytes(b) => b.clone(),
            Value::Text(s) => {
                let encoded = s.strip_prefix(ID_SCHEME).ok_or_else(|| RecordError::Malformed {
                    key: ID_KEY.to_string(),
                    reason: format!("{s:?} does not start with {ID_SCHEME:?}"),
                })?;
                bs58::decode(encoded)
                    .into_vec()
                    .map_err(|e| RecordError::Malformed {
                        key: ID_KEY.to_string(),
                        reason: e.to_string(),
                    })?
            }
            other => {
                return Err(RecordError::TypeMismatch {
                    key: ID_KEY.to_string(),
                    expected: "bytes",
                    found: other.type_name(),
                })
            }
        };
        if id.len() != ID_LEN {
            return Err(RecordError::ValidationFailed {
                target: ID_KEY.to_string(),
                reason: format!("should be {ID_LEN} bytes but {} is found", id.len()),
            });
        }
        Ok(id)
    }

    fn bytes(&self) -> RecordResult<&[u8]> {
        self.id
            .as_deref()
            .ok_or_else(|| RecordError::Invariant(format!("key {ID_KEY:?} should exist")))
    }

    fn shown(&self) -> RecordResult<String> {
        self.bytes()?;
        Ok(self.display_id().unwrap_or_default())
    }
}

impl Field for IdField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(IdField::new())
    }

    fn key(&self) -> &str {
        ID_KEY
    }

    fn is_required(&self) -> bool {
        true
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        self.decode(value, out)
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        out.insert(ID_KEY.to_string(), Value::Bytes(self.bytes()?.to_vec()));
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        let id = Self::parse(raw)?;
        out.insert(ID_KEY.to_string(), Value::Bytes(id.clone()));
        self.id = Some(id);
        Ok(())
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        out.insert(ID_KEY.to_string(), self.shown()?.into());
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        if let Some(next) = path.first() {
            return Err(RecordError::PathResolution(format!(
                "unexpected path element {next:?} past \"{ID_KEY}\""
            )));
        }
        Ok(Resolved::Value(self.shown()?.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_must_be_32_bytes() {
        let mut f = IdField::new();
        assert!(f.set(&Value::Bytes(vec![7; ID_LEN]), &mut RawMap::new()).is_ok());
        assert!(matches!(
            f.set(&Value::Bytes(vec![7; 31]), &mut RawMap::new()),
            Err(RecordError::ValidationFailed { .. })
        ));
        assert!(matches!(
            f.set(&Value::from(1u8), &mut RawMap::new()),
            Err(RecordError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn id_text_form_roundtrips() {
        let mut f = IdField::new();
        f.set(&Value::Bytes(vec![1; ID_LEN]), &mut RawMap::new()).unwrap();
        let shown = f.display_id().unwrap();
        assert!(shown.starts_with("1/"));

        let mut g = IdField::new();
        g.set(&Value::from(shown.clone()), &mut RawMap::new()).unwrap();
        assert_eq!(g.display_id(), Some(shown.clone()));

        let mut json = JsonMap::new();
        g.to_json(&mut json).unwrap();
        assert_eq!(json["id"], shown.as_str());
        assert_eq!(g.resolve(&[]).unwrap().into_value(), Value::from(shown));
    }

    #[test]
    fn id_text_requires_scheme() {
        let encoded = bs58::encode(vec![1u8; ID_LEN]).into_string();
        assert!(matches!(
            IdField::new().set(&Value::from(encoded), &mut RawMap::new()),
            Err(RecordError::Malformed { .. })
        ));
    }
}
