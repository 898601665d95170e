use crate::error::{RecordError, RecordResult};
use crate::field::{Field, FieldSpec, Link, Resolved};
use crate::json::JsonMap;
use crate::record::{Constructor, Record};
use crate::value::{RawMap, Value};

/// A sub-record embedded by value. Population is delegated to the nested
/// record's own `set_data`/`decode`.
#[derive(Debug)]
pub struct ObjectField {
    spec: FieldSpec,
    constructor: Constructor,
    record: Option<Record>,
}

impl ObjectField {
    pub fn new(key: impl Into<String>, required: bool, constructor: Constructor) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            constructor,
            record: None,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    fn entries<'v>(&self, value: &'v Value) -> RecordResult<&'v RawMap> {
        value
            .as_map()
            .ok_or_else(|| RecordError::type_mismatch(self.key(), "map", value.type_name()))
    }

    fn nested(&self) -> RecordResult<&Record> {
        self.record().ok_or_else(|| RecordError::unset(self.key()))
    }
}

impl Field for ObjectField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(ObjectField::new(
            self.spec.key(),
            self.spec.is_required(),
            self.constructor,
        ))
    }

    fn key(&self) -> &str {
        self.spec.key()
    }

    fn is_required(&self) -> bool {
        self.spec.is_required()
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        let entries = self.entries(value)?.clone();
        let mut record = (self.constructor)()?;
        record.set_data(entries)?;
        out.insert(self.key().to_string(), record.to_value());
        self.record = Some(record);
        Ok(())
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        let map = self.nested()?.canonical_map()?;
        out.insert(self.key().to_string(), Value::Map(map));
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        let entries = self.entries(raw)?.clone();
        let mut record = (self.constructor)()?;
        record.decode(entries)?;
        out.insert(self.key().to_string(), record.to_value());
        self.record = Some(record);
        Ok(())
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        let map = self.nested()?.to_json_map()?;
        out.insert(self.key().to_string(), serde_json::Value::Object(map));
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        self.nested()?.resolve(path)
    }

    fn links(&self, prefix: &str, out: &mut Vec<Link>) {
        if let Some(record) = &self.record {
            record.collect_links(prefix, out);
        }
    }

    fn tree(&self, prefix: &str, out: &mut Vec<String>) {
        if let Some(record) = &self.record {
            record.collect_paths(prefix, out);
        }
    }
}
