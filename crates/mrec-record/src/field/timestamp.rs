use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RecordError, RecordResult};
use crate::field::{ensure_terminal, Field, FieldSpec, Resolved};
use crate::json::JsonMap;
use crate::value::{RawMap, Value};

/// `YYYY-MM-DDTHH:MM:SS` followed by `Z` or a `±HH:MM` offset.
pub const TIMESTAMP_PATTERN: &str = concat!(
    r"^[0-9]{4}-(?:1[0-2]|0[1-9])-(?:3[01]|0[1-9]|[12][0-9])",
    r"T(?:2[0-3]|[01][0-9]):[0-5][0-9]:[0-5][0-9]",
    r"(?:Z|[+-](?:2[0-3]|[01][0-9]):[0-5][0-9])$",
);

static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(TIMESTAMP_PATTERN).expect("timestamp pattern compiles"));

/// ISO-8601 timestamp string with a mandatory timezone.
#[derive(Clone, Debug)]
pub struct TimestampField {
    spec: FieldSpec,
    value: Option<String>,
}

impl TimestampField {
    pub fn new(key: impl Into<String>, required: bool) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            value: None,
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn accept(&mut self, value: &Value) -> RecordResult<()> {
        let s = value
            .as_str()
            .ok_or_else(|| RecordError::type_mismatch(self.key(), "string", value.type_name()))?;
        if !TIMESTAMP_RE.is_match(s) {
            return Err(RecordError::PatternMismatch {
                key: self.key().to_string(),
                value: s.to_string(),
            });
        }
        self.value = Some(s.to_string());
        Ok(())
    }

    fn text(&self) -> RecordResult<&str> {
        self.get().ok_or_else(|| RecordError::unset(self.key()))
    }
}

impl Field for TimestampField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(TimestampField::new(self.spec.key(), self.spec.is_required()))
    }

    fn key(&self) -> &str {
        self.spec.key()
    }

    fn is_required(&self) -> bool {
        self.spec.is_required()
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        self.decode(value, out)
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        out.insert(self.key().to_string(), Value::from(self.text()?));
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        self.accept(raw)?;
        out.insert(self.key().to_string(), raw.clone());
        Ok(())
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        out.insert(self.key().to_string(), self.text()?.into());
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        ensure_terminal(self.key(), path)?;
        Ok(Resolved::Value(Value::from(self.text()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(s: &str) -> RecordResult<()> {
        TimestampField::new("timestamp", true).set(&Value::from(s), &mut RawMap::new())
    }

    #[test]
    fn accepts_utc_and_offsets() {
        assert!(check("2020-01-01T00:00:00Z").is_ok());
        assert!(check("1999-12-31T23:59:59+08:00").is_ok());
        assert!(check("2021-06-30T12:00:00-05:30").is_ok());
    }

    #[test]
    fn rejects_bad_month() {
        assert!(matches!(
            check("2020-13-01T00:00:00Z"),
            Err(RecordError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn rejects_missing_timezone() {
        assert!(matches!(
            check("2020-01-01T00:00:00"),
            Err(RecordError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_components() {
        for s in [
            "2020-00-01T00:00:00Z",
            "2020-01-32T00:00:00Z",
            "2020-01-00T00:00:00Z",
            "2020-01-01T24:00:00Z",
            "2020-01-01T00:60:00Z",
            "2020-01-01T00:00:60Z",
            "2020-01-01T00:00:00+24:00",
            "20-01-01T00:00:00Z",
            "2020-01-01 00:00:00Z",
        ] {
            assert!(check(s).is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn non_string_is_type_mismatch() {
        assert!(matches!(
            TimestampField::new("t", true).set(&Value::from(1u8), &mut RawMap::new()),
            Err(RecordError::TypeMismatch { .. })
        ));
    }
}
