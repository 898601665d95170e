//! Canonical CBOR form of a record map.
//!
//! The canonical bytes are the only representation whose hash defines a
//! record's identity. Map keys are text and are ordered the RFC 7049 way
//! (shorter keys first, then bytewise), which is the ordering of
//! `serde_cbor::Value` map keys, so the same logical map always produces the
//! same bytes regardless of insertion order.

use std::collections::BTreeMap;

use serde_cbor::Value as Cbor;

use mrec_types::Cid;

use crate::error::{RecordError, RecordResult};
use crate::value::{RawMap, Value};

/// CBOR tag marking a content link (DAG-CBOR convention).
pub const LINK_TAG: u64 = 42;

/// Serialize a map into canonical bytes.
pub fn to_bytes(map: &RawMap) -> RecordResult<Vec<u8>> {
    serde_cbor::to_vec(&map_to_cbor(map)).map_err(|e| RecordError::Canonical(e.to_string()))
}

/// Parse canonical bytes back into a map.
pub fn from_bytes(data: &[u8]) -> RecordResult<RawMap> {
    let value: Cbor =
        serde_cbor::from_slice(data).map_err(|e| RecordError::Canonical(e.to_string()))?;
    match value {
        Cbor::Map(entries) => map_from_cbor(entries),
        _ => Err(RecordError::Canonical(
            "top-level value is not a map".to_string(),
        )),
    }
}

fn map_to_cbor(map: &RawMap) -> Cbor {
    Cbor::Map(
        map.iter()
            .map(|(k, v)| (Cbor::Text(k.clone()), to_cbor(v)))
            .collect(),
    )
}

fn to_cbor(value: &Value) -> Cbor {
    match value {
        Value::Null => Cbor::Null,
        Value::Bool(b) => Cbor::Bool(*b),
        Value::Int(i) => Cbor::Integer(i128::from(*i)),
        Value::Uint(u) => Cbor::Integer(i128::from(*u)),
        Value::Float(f) => Cbor::Float(*f),
        Value::Bytes(b) => Cbor::Bytes(b.clone()),
        Value::Text(s) => Cbor::Text(s.clone()),
        Value::Link(cid) => {
            let mut bytes = vec![0x00];
            bytes.extend_from_slice(&cid.to_bytes());
            Cbor::Tag(LINK_TAG, Box::new(Cbor::Bytes(bytes)))
        }
        Value::Array(items) => Cbor::Array(items.iter().map(to_cbor).collect()),
        Value::Map(map) => map_to_cbor(map),
    }
}

fn map_from_cbor(entries: BTreeMap<Cbor, Cbor>) -> RecordResult<RawMap> {
    let mut map = RawMap::new();
    for (k, v) in entries {
        let Cbor::Text(key) = k else {
            return Err(RecordError::Canonical(format!(
                "map key must be text, found {k:?}"
            )));
        };
        map.insert(key, from_cbor(v)?);
    }
    Ok(map)
}

fn from_cbor(value: Cbor) -> RecordResult<Value> {
    Ok(match value {
        Cbor::Null => Value::Null,
        Cbor::Bool(b) => Value::Bool(b),
        Cbor::Integer(i) if i >= 0 => Value::Uint(
            u64::try_from(i).map_err(|_| RecordError::Canonical(format!("integer {i} overflows")))?,
        ),
        Cbor::Integer(i) => Value::Int(
            i64::try_from(i).map_err(|_| RecordError::Canonical(format!("integer {i} overflows")))?,
        ),
        Cbor::Float(f) => Value::Float(f),
        Cbor::Bytes(b) => Value::Bytes(b),
        Cbor::Text(s) => Value::Text(s),
        Cbor::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_cbor)
                .collect::<RecordResult<Vec<_>>>()?,
        ),
        Cbor::Map(entries) => Value::Map(map_from_cbor(entries)?),
        Cbor::Tag(LINK_TAG, inner) => match *inner {
            Cbor::Bytes(bytes) if bytes.first() == Some(&0x00) => {
                Value::Link(Cid::try_from_bytes(&bytes[1..])?)
            }
            _ => {
                return Err(RecordError::Canonical(
                    "link tag must wrap 0x00-prefixed CID bytes".to_string(),
                ))
            }
        },
        Cbor::Tag(tag, _) => {
            return Err(RecordError::Canonical(format!("unsupported CBOR tag {tag}")))
        }
        other => {
            return Err(RecordError::Canonical(format!(
                "unsupported CBOR value {other:?}"
            )))
        }
    })
}
