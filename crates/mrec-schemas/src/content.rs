//! Content: descriptor of the registered work.

use mrec_record::field::{
    ArrayField, ConditionalLinkField, Field, NumberField, NumberKind, StringField, ELEMENT_KEY,
};
use mrec_record::{Constructor, Record, RecordResult, SchemaRegistry};
use mrec_types::codec;

pub const NAME: &str = "content";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::CONTENT, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Record::new(
        codec::CONTENT,
        NAME,
        1,
        vec![
            Box::new(StringField::new("type", true)) as Box<dyn Field>,
            Box::new(NumberField::new("version", true, NumberKind::Uint64)),
            Box::new(ConditionalLinkField::new("parent", codec::CONTENT, "version")),
            Box::new(StringField::new("source", false)),
            Box::new(StringField::new("edition", false)),
            Box::new(StringField::new("fingerprint", true)),
            Box::new(StringField::new("title", true)),
            Box::new(StringField::new("description", false)),
            Box::new(ArrayField::new(
                "tags",
                false,
                StringField::new(ELEMENT_KEY, true),
            )),
        ],
    )
}
