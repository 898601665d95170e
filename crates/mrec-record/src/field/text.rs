use crate::error::{RecordError, RecordResult};
use crate::field::{ensure_terminal, Field, FieldSpec, Resolved};
use crate::json::JsonMap;
use crate::value::{RawMap, Value};

/// UTF-8 string field, optionally restricted to a fixed allow-list.
#[derive(Clone, Debug)]
pub struct StringField {
    spec: FieldSpec,
    allowed: Option<Vec<String>>,
    value: Option<String>,
}

impl StringField {
    pub fn new(key: impl Into<String>, required: bool) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            allowed: None,
            value: None,
        }
    }

    /// A string field that only accepts one of `allowed`.
    pub fn with_filter(key: impl Into<String>, required: bool, allowed: &[&str]) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            allowed: Some(allowed.iter().map(|s| s.to_string()).collect()),
            value: None,
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn accept(&mut self, value: &Value) -> RecordResult<&str> {
        let s = value
            .as_str()
            .ok_or_else(|| RecordError::type_mismatch(self.key(), "string", value.type_name()))?;
        if let Some(allowed) = &self.allowed {
            if !allowed.iter().any(|a| a == s) {
                return Err(RecordError::ValidationFailed {
                    target: self.key().to_string(),
                    reason: format!("{s:?} is not one of {allowed:?}"),
                });
            }
        }
        Ok(self.value.insert(s.to_string()))
    }

    fn text(&self) -> RecordResult<&str> {
        self.get().ok_or_else(|| RecordError::unset(self.key()))
    }
}

impl Field for StringField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(Self {
            spec: self.spec.clone(),
            allowed: self.allowed.clone(),
            value: None,
        })
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
        let s = self.accept(raw)?.to_string();
        out.insert(self.key().to_string(), Value::Text(s));
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

    #[test]
    fn plain_string_accepts_any_text() {
        let mut f = StringField::new("title", true);
        f.set(&Value::from("Hello"), &mut RawMap::new()).unwrap();
        assert_eq!(f.get(), Some("Hello"));

        let mut out = RawMap::new();
        f.encode(&mut out).unwrap();
        assert_eq!(out["title"].as_str(), Some("Hello"));
    }

    #[test]
    fn non_string_is_type_mismatch() {
        let mut f = StringField::new("title", true);
        assert!(matches!(
            f.set(&Value::from(3u8), &mut RawMap::new()),
            Err(RecordError::TypeMismatch { expected: "string", found: "uint", .. })
        ));
    }

    #[test]
    fn filter_rejects_unknown_values() {
        let mut f = StringField::with_filter("type", true, &["Creator", "Editor"]);
        assert!(f.set(&Value::from("Editor"), &mut RawMap::new()).is_ok());
        assert!(matches!(
            f.set(&Value::from("Janitor"), &mut RawMap::new()),
            Err(RecordError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn prototype_keeps_filter_but_not_value() {
        let mut f = StringField::with_filter("type", true, &["Creator"]);
        f.set(&Value::from("Creator"), &mut RawMap::new()).unwrap();
        let mut p = f.prototype();
        assert!(p.encode(&mut RawMap::new()).is_err());
        assert!(p.set(&Value::from("Other"), &mut RawMap::new()).is_err());
    }

    #[test]
    fn decode_reports_decoded_text() {
        let mut f = StringField::new("name", false);
        let mut out = RawMap::new();
        f.decode(&Value::from("Alice"), &mut out).unwrap();
        assert_eq!(out["name"], Value::from("Alice"));
        let mut json = JsonMap::new();
        f.to_json(&mut json).unwrap();
        assert_eq!(json["name"], "Alice");
    }
}
