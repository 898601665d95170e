//! Right: one grant of rights to an entity, nested inside a rights record.

use mrec_record::field::{Field, LinkField, ObjectField, StringField};
use mrec_record::{Constructor, Record, RecordResult, SchemaRegistry};
use mrec_types::codec;

use crate::time_period;

pub const NAME: &str = "right";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::RIGHT, vec![schema_v1 as Constructor])
}

/// `terms` links to the raw license text.
pub fn schema_v1() -> RecordResult<Record> {
    Record::new(
        codec::RIGHT,
        NAME,
        1,
        vec![
            Box::new(LinkField::new("holder", true, codec::ENTITY)) as Box<dyn Field>,
            Box::new(StringField::new("type", true)),
            Box::new(LinkField::new("terms", true, codec::RAW)),
            Box::new(ObjectField::new("period", false, time_period::schema_v1)),
            Box::new(StringField::new("territory", false)),
        ],
    )
}
