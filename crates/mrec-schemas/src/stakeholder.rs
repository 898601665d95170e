//! Stakeholder: one party and its share, nested inside a stakeholders record.
//!
//! A `FootprintStakeholder` additionally carries a `footprint`, pointing at
//! the underlying work either as a kernel link or as a URL.

use mrec_record::error::RecordError;
use mrec_record::field::{
    Field, Link, LinkField, NumberField, NumberKind, Resolved, StringField,
};
use mrec_record::json::JsonMap;
use mrec_record::{Constructor, RawMap, Record, RecordResult, SchemaRegistry, Value};
use mrec_types::codec;

pub const NAME: &str = "stakeholder";

pub const CREATOR: &str = "Creator";
pub const CONTRIBUTOR: &str = "Contributor";
pub const EDITOR: &str = "Editor";
pub const PUBLISHER: &str = "Publisher";
pub const FOOTPRINT_STAKEHOLDER: &str = "FootprintStakeholder";
pub const ESCROW: &str = "Escrow";

/// Accepted values of `type`.
pub const TYPES: [&str; 6] = [
    CREATOR,
    CONTRIBUTOR,
    EDITOR,
    PUBLISHER,
    FOOTPRINT_STAKEHOLDER,
    ESCROW,
];

const FOOTPRINT_KEY: &str = "footprint";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::STAKEHOLDER, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Ok(Record::new(
        codec::STAKEHOLDER,
        NAME,
        1,
        vec![
            Box::new(StringField::with_filter("type", true, &TYPES)) as Box<dyn Field>,
            Box::new(LinkField::new("stakeholder", true, codec::ENTITY)),
            Box::new(NumberField::new("sharing", true, NumberKind::Uint32)),
            Box::new(FootprintField::new()),
        ],
    )?
    .with_validator(validate_v1))
}

/// `footprint` is present exactly when the stakeholder is a footprint
/// stakeholder.
fn validate_v1(record: &Record) -> RecordResult<()> {
    let is_footprint = record.get_str("type")? == FOOTPRINT_STAKEHOLDER;
    let has_footprint = record.get(FOOTPRINT_KEY).is_ok();
    let reason = match (is_footprint, has_footprint) {
        (true, false) => "footprint is missing",
        (false, true) => "footprint must not be set as this is not a footprint stakeholder",
        _ => return Ok(()),
    };
    Err(RecordError::ValidationFailed {
        target: record.to_string(),
        reason: reason.to_string(),
    })
}

/// The concrete form a footprint took.
#[derive(Clone, Debug)]
enum Footprint {
    Link(LinkField),
    Url(StringField),
}

impl Footprint {
    fn handler(&self) -> &dyn Field {
        match self {
            Footprint::Link(f) => f as &dyn Field,
            Footprint::Url(f) => f,
        }
    }

    fn handler_mut(&mut self) -> &mut dyn Field {
        match self {
            Footprint::Link(f) => f as &mut dyn Field,
            Footprint::Url(f) => f,
        }
    }
}

/// Link to a kernel or a URL string; the input's shape picks the handler.
#[derive(Clone, Debug, Default)]
pub struct FootprintField {
    inner: Option<Footprint>,
}

impl FootprintField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the handler for a value. Raw CID bytes only occur in canonical
    /// form; caller input carries links as `Value::Link`.
    fn choose(value: &Value, canonical: bool) -> RecordResult<Footprint> {
        match value {
            Value::Link(_) => Ok(Footprint::Link(Self::link_handler())),
            Value::Bytes(_) if canonical => Ok(Footprint::Link(Self::link_handler())),
            Value::Text(_) => Ok(Footprint::Url(StringField::new(FOOTPRINT_KEY, false))),
            other => Err(RecordError::TypeMismatch {
                key: FOOTPRINT_KEY.to_string(),
                expected: "link or string",
                found: other.type_name(),
            }),
        }
    }

    fn link_handler() -> LinkField {
        LinkField::new(FOOTPRINT_KEY, false, codec::ISCN)
    }

    fn handler(&self) -> RecordResult<&dyn Field> {
        self.inner
            .as_ref()
            .map(Footprint::handler)
            .ok_or_else(|| RecordError::Invariant(format!("key {FOOTPRINT_KEY:?} should exist")))
    }
}

impl Field for FootprintField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(FootprintField::new())
    }

    fn key(&self) -> &str {
        FOOTPRINT_KEY
    }

    fn is_required(&self) -> bool {
        false
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        let mut footprint = Self::choose(value, false)?;
        footprint.handler_mut().set(value, out)?;
        self.inner = Some(footprint);
        Ok(())
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        self.handler()?.encode(out)
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        let mut footprint = Self::choose(raw, true)?;
        footprint.handler_mut().decode(raw, out)?;
        self.inner = Some(footprint);
        Ok(())
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        self.handler()?.to_json(out)
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        self.handler()?.resolve(path)
    }

    fn links(&self, prefix: &str, out: &mut Vec<Link>) {
        if let Some(footprint) = &self.inner {
            footprint.handler().links(prefix, out);
        }
    }
}
