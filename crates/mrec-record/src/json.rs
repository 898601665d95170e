//! JSON projection helpers.
//!
//! The JSON view is for humans and tooling; it never feeds identity. Links
//! render as `{"/": "/ipfs/<cid>"}`, bytes as standard base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;

use mrec_types::Cid;

use crate::error::{RecordError, RecordResult};
use crate::value::{RawMap, Value};

/// Insertion-ordered JSON object (serde_json's `preserve_order` map).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

const LINK_KEY: &str = "/";
const IPFS_PREFIX: &str = "/ipfs/";

/// JSON form of a link.
pub fn link_to_json(cid: &Cid) -> serde_json::Value {
    json!({ "/": format!("{IPFS_PREFIX}{cid}") })
}

/// JSON form of an arbitrary interchange value.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Uint(u) => json!(u),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Bytes(b) => serde_json::Value::String(STANDARD.encode(b)),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Link(cid) => link_to_json(cid),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

/// Interchange value from JSON input.
///
/// An object whose only key is `"/"` is read as a link; the CID may carry
/// the `/ipfs/` prefix. Strings stay strings (bytes cannot be expressed).
pub fn value_from_json(value: &serde_json::Value) -> RecordResult<Value> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(value_from_json)
                .collect::<RecordResult<Vec<_>>>()?,
        ),
        serde_json::Value::Object(obj) => {
            if let (1, Some(serde_json::Value::String(link))) = (obj.len(), obj.get(LINK_KEY)) {
                let cid = link.strip_prefix(IPFS_PREFIX).unwrap_or(link);
                Value::Link(cid.parse()?)
            } else {
                Value::Map(object_from_json(obj)?)
            }
        }
    })
}

/// Raw input map from a JSON object.
pub fn map_from_json(value: &serde_json::Value) -> RecordResult<RawMap> {
    match value {
        serde_json::Value::Object(obj) => object_from_json(obj),
        other => Err(RecordError::type_mismatch(
            "<root>",
            "object",
            json_type_name(other),
        )),
    }
}

fn object_from_json(obj: &JsonMap) -> RecordResult<RawMap> {
    obj.iter()
        .map(|(k, v)| Ok((k.clone(), value_from_json(v)?)))
        .collect()
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
