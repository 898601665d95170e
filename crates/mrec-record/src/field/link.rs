use mrec_types::Cid;

use crate::error::{RecordError, RecordResult};
use crate::field::{Field, FieldSpec, Link, Resolved};
use crate::json::{link_to_json, JsonMap};
use crate::value::{RawMap, Value};

/// Merkle link to content of one declared kind. Canonical form is the raw
/// binary CID.
#[derive(Clone, Debug)]
pub struct LinkField {
    spec: FieldSpec,
    codec: u64,
    cid: Option<Cid>,
}

impl LinkField {
    pub fn new(key: impl Into<String>, required: bool, codec: u64) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            codec,
            cid: None,
        }
    }

    /// Codec tag every linked CID must carry.
    pub fn target_codec(&self) -> u64 {
        self.codec
    }

    pub fn get(&self) -> Option<&Cid> {
        self.cid.as_ref()
    }

    pub(crate) fn clear(&mut self) {
        self.cid = None;
    }

    fn accept(&mut self, cid: Cid) -> RecordResult<()> {
        if cid.codec() != self.codec {
            return Err(RecordError::LinkCodecMismatch {
                key: self.key().to_string(),
                expected: self.codec,
                found: cid.codec(),
            });
        }
        self.cid = Some(cid);
        Ok(())
    }

    fn linked(&self) -> RecordResult<&Cid> {
        self.get().ok_or_else(|| RecordError::unset(self.key()))
    }
}

/// Parse raw CID bytes held by `raw`, reporting failures against `key`.
pub(crate) fn cid_from_raw(key: &str, raw: &Value) -> RecordResult<Cid> {
    let bytes = raw
        .as_bytes()
        .ok_or_else(|| RecordError::type_mismatch(key, "bytes", raw.type_name()))?;
    Cid::try_from_bytes(bytes).map_err(|e| RecordError::Malformed {
        key: key.to_string(),
        reason: format!("invalid CID: {e}"),
    })
}

impl Field for LinkField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(LinkField::new(self.spec.key(), self.spec.is_required(), self.codec))
    }

    fn key(&self) -> &str {
        self.spec.key()
    }

    fn is_required(&self) -> bool {
        self.spec.is_required()
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        let cid = value
            .as_link()
            .ok_or_else(|| RecordError::type_mismatch(self.key(), "link", value.type_name()))?;
        self.accept(cid.clone())?;
        out.insert(self.key().to_string(), Value::Link(cid.clone()));
        Ok(())
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        out.insert(self.key().to_string(), Value::Bytes(self.linked()?.to_bytes()));
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        let cid = cid_from_raw(self.key(), raw)?;
        self.accept(cid.clone())?;
        out.insert(self.key().to_string(), Value::Link(cid));
        Ok(())
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        out.insert(self.key().to_string(), link_to_json(self.linked()?));
        Ok(())
    }

    /// A link always stops local resolution; the remainder travels with the
    /// marker.
    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        Ok(Resolved::Link {
            cid: self.linked()?.clone(),
            rest: path.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn links(&self, prefix: &str, out: &mut Vec<Link>) {
        if let Some(cid) = &self.cid {
            out.push(Link {
                name: prefix.to_string(),
                cid: cid.clone(),
            });
        }
    }
}
