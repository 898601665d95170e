use std::fmt;

use serde_json::json;

use mrec_types::varint;

use crate::error::{RecordError, RecordResult};
use crate::field::{ensure_terminal, Field, FieldSpec, Resolved};
use crate::json::JsonMap;
use crate::value::{RawMap, Value};

/// Declared width and signedness of a numeric field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Int32,
    Uint32,
    Int64,
    Uint64,
}

impl NumberKind {
    pub fn is_signed(self) -> bool {
        matches!(self, NumberKind::Int32 | NumberKind::Int64)
    }

    fn bounds(self) -> (i128, i128) {
        match self {
            NumberKind::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            NumberKind::Uint32 => (0, i128::from(u32::MAX)),
            NumberKind::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            NumberKind::Uint64 => (0, i128::from(u64::MAX)),
        }
    }

    /// Narrow an interchange integer into this kind, checking range and sign.
    pub fn narrow(self, key: &str, value: &Value) -> RecordResult<Number> {
        let n = value
            .as_i128()
            .ok_or_else(|| RecordError::type_mismatch(key, "integer", value.type_name()))?;
        self.narrow_i128(key, n)
    }

    fn narrow_i128(self, key: &str, n: i128) -> RecordResult<Number> {
        let out_of_range = || RecordError::RangeError {
            key: key.to_string(),
            kind: self,
            value: n.to_string(),
        };
        let (min, max) = self.bounds();
        if n < min || n > max {
            return Err(out_of_range());
        }
        Ok(match self {
            NumberKind::Int32 => Number::I32(i32::try_from(n).map_err(|_| out_of_range())?),
            NumberKind::Uint32 => Number::U32(u32::try_from(n).map_err(|_| out_of_range())?),
            NumberKind::Int64 => Number::I64(i64::try_from(n).map_err(|_| out_of_range())?),
            NumberKind::Uint64 => Number::U64(u64::try_from(n).map_err(|_| out_of_range())?),
        })
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumberKind::Int32 => "int32",
            NumberKind::Uint32 => "uint32",
            NumberKind::Int64 => "int64",
            NumberKind::Uint64 => "uint64",
        })
    }
}

/// A narrowed number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Number {
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
}

impl Number {
    pub fn to_value(self) -> Value {
        match self {
            Number::I32(v) => Value::from(v),
            Number::U32(v) => Value::from(v),
            Number::I64(v) => Value::from(v),
            Number::U64(v) => Value::from(v),
        }
    }

    /// Varint bytes: zig-zag for signed kinds, plain LEB128 otherwise.
    fn to_varint(self) -> Vec<u8> {
        match self {
            Number::I32(v) => varint::encode_varint(i64::from(v)),
            Number::I64(v) => varint::encode_varint(v),
            Number::U32(v) => varint::encode_uvarint(u64::from(v)),
            Number::U64(v) => varint::encode_uvarint(v),
        }
    }

    fn to_json(self) -> serde_json::Value {
        match self {
            Number::I32(v) => json!(v),
            Number::U32(v) => json!(v),
            Number::I64(v) => json!(v),
            Number::U64(v) => json!(v),
        }
    }
}

/// Integer field of a fixed width, stored canonically as a varint.
#[derive(Clone, Debug)]
pub struct NumberField {
    spec: FieldSpec,
    kind: NumberKind,
    value: Option<Number>,
}

impl NumberField {
    pub fn new(key: impl Into<String>, required: bool, kind: NumberKind) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            kind,
            value: None,
        }
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn get(&self) -> Option<Number> {
        self.value
    }

    fn number(&self) -> RecordResult<Number> {
        self.value.ok_or_else(|| RecordError::unset(self.key()))
    }
}

impl Field for NumberField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(NumberField::new(self.spec.key(), self.spec.is_required(), self.kind))
    }

    fn key(&self) -> &str {
        self.spec.key()
    }

    fn is_required(&self) -> bool {
        self.spec.is_required()
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        let number = self.kind.narrow(self.key(), value)?;
        self.value = Some(number);
        out.insert(self.key().to_string(), number.to_value());
        Ok(())
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        out.insert(self.key().to_string(), Value::Bytes(self.number()?.to_varint()));
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        let key = self.key().to_string();
        let bytes = raw
            .as_bytes()
            .ok_or_else(|| RecordError::type_mismatch(&key, "bytes", raw.type_name()))?;
        let malformed = |e: mrec_types::TypeError| RecordError::Malformed {
            key: key.clone(),
            reason: e.to_string(),
        };
        let n = if self.kind.is_signed() {
            i128::from(varint::decode_varint(bytes).map_err(malformed)?)
        } else {
            i128::from(varint::decode_uvarint(bytes).map_err(malformed)?)
        };
        let number = self.kind.narrow_i128(&key, n)?;
        self.value = Some(number);
        out.insert(key, number.to_value());
        Ok(())
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        out.insert(self.key().to_string(), self.number()?.to_json());
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        ensure_terminal(self.key(), path)?;
        Ok(Resolved::Value(self.number()?.to_value()))
    }
}
