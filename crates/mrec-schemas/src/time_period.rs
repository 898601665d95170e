//! Time period: an optional validity window nested inside a right.

use mrec_record::field::{Field, TimestampField};
use mrec_record::{Constructor, Record, RecordError, RecordResult, SchemaRegistry};
use mrec_types::codec;

pub const NAME: &str = "timeperiod";

pub fn register(registry: &mut SchemaRegistry) -> RecordResult<()> {
    registry.register(NAME, codec::TIME_PERIOD, vec![schema_v1 as Constructor])
}

pub fn schema_v1() -> RecordResult<Record> {
    Ok(Record::new(
        codec::TIME_PERIOD,
        NAME,
        1,
        vec![
            Box::new(TimestampField::new("from", false)) as Box<dyn Field>,
            Box::new(TimestampField::new("to", false)),
        ],
    )?
    .with_validator(validate_v1))
}

/// At least one end of the window must be given.
fn validate_v1(record: &Record) -> RecordResult<()> {
    if record.get("from").is_err() && record.get("to").is_err() {
        return Err(RecordError::ValidationFailed {
            target: record.to_string(),
            reason: "at least \"from\" or \"to\" must exist".to_string(),
        });
    }
    Ok(())
}
