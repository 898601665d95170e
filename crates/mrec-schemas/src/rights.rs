//! Rights: the list of rights attached to a kernel.

use mrec_record::field::{ArrayField, Field, ObjectField, ELEMENT_KEY};
use mrec_record::{Constructor, Record, RecordResult, SchemaRegistry};
use mrec_types::codec;

use crate::right;

pub const NAME: &str = "rights";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::RIGHTS, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Record::new(
        codec::RIGHTS,
        NAME,
        1,
        vec![Box::new(ArrayField::new(
            "rights",
            true,
            ObjectField::new(ELEMENT_KEY, true, right::schema_v1),
        )) as Box<dyn Field>],
    )
}
