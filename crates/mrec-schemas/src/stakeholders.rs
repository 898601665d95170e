//! Stakeholders: the list of parties sharing in a kernel.

use mrec_record::field::{ArrayField, Field, ObjectField, ELEMENT_KEY};
use mrec_record::{Constructor, Record, RecordResult, SchemaRegistry};
use mrec_types::codec;

use crate::stakeholder;

pub const NAME: &str = "stakeholders";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::STAKEHOLDERS, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Record::new(
        codec::STAKEHOLDERS,
        NAME,
        1,
        vec![Box::new(ArrayField::new(
            "stakeholders",
            true,
            ObjectField::new(ELEMENT_KEY, true, stakeholder::schema_v1),
        )) as Box<dyn Field>],
    )
}
