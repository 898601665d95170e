use crate::error::{RecordError, RecordResult};
use crate::field::{Field, Link, LinkField, Resolved};
use crate::json::JsonMap;
use crate::value::{RawMap, Value};

/// A link whose presence is gated by a companion version field: forbidden
/// while the companion is 1, required once it is greater.
///
/// Always optional at the record level; the gate is enforced in
/// [`Field::validate`] against the sibling values.
#[derive(Clone, Debug)]
pub struct ConditionalLinkField {
    link: LinkField,
    companion: String,
}

impl ConditionalLinkField {
    pub fn new(key: impl Into<String>, codec: u64, companion: impl Into<String>) -> Self {
        Self {
            link: LinkField::new(key, false, codec),
            companion: companion.into(),
        }
    }

    /// Key of the version field this link is gated on.
    pub fn companion(&self) -> &str {
        &self.companion
    }

    pub fn link(&self) -> &LinkField {
        &self.link
    }

    fn expects_link(&self, siblings: &RawMap) -> RecordResult<bool> {
        let version = siblings
            .get(&self.companion)
            .and_then(Value::as_i128)
            .ok_or_else(|| RecordError::ValidationFailed {
                target: self.key().to_string(),
                reason: format!("cannot read version from {:?}", self.companion),
            })?;
        Ok(version > 1)
    }
}

impl Field for ConditionalLinkField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(ConditionalLinkField::new(
            self.link.key(),
            self.link.target_codec(),
            self.companion.clone(),
        ))
    }

    fn key(&self) -> &str {
        self.link.key()
    }

    fn is_required(&self) -> bool {
        false
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        if value.is_null() {
            self.link.clear();
            return Ok(());
        }
        self.link.set(value, out)
    }

    fn validate(&self, siblings: &RawMap) -> RecordResult<()> {
        let expected = self.expects_link(siblings)?;
        match (expected, self.link.get().is_some()) {
            (true, false) => Err(RecordError::ValidationFailed {
                target: self.key().to_string(),
                reason: format!("required as {} > 1", self.companion),
            }),
            (false, true) => Err(RecordError::ValidationFailed {
                target: self.key().to_string(),
                reason: format!("must not be set as {} <= 1", self.companion),
            }),
            _ => Ok(()),
        }
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        if self.link.get().is_some() {
            self.link.encode(out)?;
        }
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        self.link.decode(raw, out)
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        if self.link.get().is_some() {
            self.link.to_json(out)?;
        }
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        if self.link.get().is_none() {
            return Err(RecordError::NoSuchLink(self.key().to_string()));
        }
        self.link.resolve(path)
    }

    fn links(&self, prefix: &str, out: &mut Vec<Link>) {
        self.link.links(prefix, out);
    }
}
