//! Entity: a person or organisation referenced by rights and stakeholders.

use mrec_record::field::{Field, StringField};
use mrec_record::{Constructor, Record, RecordResult, SchemaRegistry};
use mrec_types::codec;

pub const NAME: &str = "entity";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::ENTITY, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Record::new(
        codec::ENTITY,
        NAME,
        1,
        vec![
            Box::new(StringField::new("id", true)) as Box<dyn Field>,
            Box::new(StringField::new("name", false)),
            Box::new(StringField::new("description", false)),
        ],
    )
}
