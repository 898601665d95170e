//! The record engine.
//!
//! A [`Record`] is one versioned object: a synthetic context field followed
//! by the ordered schema fields of its version, plus a bag of custom keys the
//! schema does not claim. Its lifecycle is
//!
//! ```text
//! new ─▶ set_data | decode ─▶ encode
//! (schema bound)  (data bound)  (finalized: bytes + CID)
//! ```
//!
//! Populating twice fails with [`RecordError::AlreadyFinalized`]. Keys that
//! the active schema declares are always interpreted by the schema; only
//! unclaimed keys reach the custom bag, and the bag never overrides a schema
//! field on encode.

use std::fmt;

use serde_json::json;
use tracing::{debug, trace};

use mrec_crypto::ContentHasher;
use mrec_types::Cid;

use crate::canonical;
use crate::error::{RecordError, RecordResult};
use crate::field::{join_path, ContextField, Field, Link, Resolved, CONTEXT_KEY};
use crate::json::{value_to_json, JsonMap};
use crate::value::{RawMap, Value};

/// Builds an empty record bound to one schema version.
pub type Constructor = fn() -> RecordResult<Record>;

/// Cross-field check run at the end of `set_data`/`decode`.
pub type Validator = fn(&Record) -> RecordResult<()>;

#[derive(Debug)]
struct Block {
    cid: Cid,
    raw: Vec<u8>,
}

/// One versioned, schema-bound object.
#[derive(Debug)]
pub struct Record {
    codec: u64,
    name: String,
    context: ContextField,
    fields: Vec<Box<dyn Field>>,
    validator: Option<Validator>,
    hasher: ContentHasher,
    data: Option<RawMap>,
    custom: RawMap,
    block: Option<Block>,
}

impl Record {
    /// Bind a schema: `fields` in declared order, the context field implied.
    pub fn new(
        codec: u64,
        name: impl Into<String>,
        version: u64,
        fields: Vec<Box<dyn Field>>,
    ) -> RecordResult<Self> {
        let name = name.into();
        if version == 0 {
            return Err(RecordError::VersionNotImplemented {
                kind: name,
                version,
            });
        }
        for (i, field) in fields.iter().enumerate() {
            let key = field.key();
            if key == CONTEXT_KEY || fields[..i].iter().any(|f| f.key() == key) {
                return Err(RecordError::DuplicateField(key.to_string()));
            }
        }
        Ok(Self {
            codec,
            context: ContextField::new(name.clone(), version),
            name,
            fields,
            validator: None,
            hasher: ContentHasher::default(),
            data: None,
            custom: RawMap::new(),
            block: None,
        })
    }

    /// Attach the schema version's cross-field validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Hash function used by [`Record::encode`].
    pub fn set_hasher(&mut self, hasher: ContentHasher) {
        self.hasher = hasher;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codec(&self) -> u64 {
        self.codec
    }

    pub fn version(&self) -> u64 {
        self.context.version()
    }

    /// Keys in serialization order, context first.
    pub fn keys(&self) -> Vec<&str> {
        std::iter::once(CONTEXT_KEY)
            .chain(self.fields.iter().map(|f| f.key()))
            .collect()
    }

    pub fn field(&self, key: &str) -> Option<&dyn Field> {
        self.fields
            .iter()
            .find(|f| f.key() == key)
            .map(|f| f.as_ref())
    }

    /// Bound schema values in decoded form. `set_data` and `decode` of the
    /// same content bind equal maps.
    pub fn data(&self) -> Option<&RawMap> {
        self.data.as_ref()
    }

    /// Keys not claimed by the schema, kept verbatim.
    pub fn custom(&self) -> &RawMap {
        &self.custom
    }

    /// Identifier, once finalized.
    pub fn cid(&self) -> Option<&Cid> {
        self.block.as_ref().map(|b| &b.cid)
    }

    /// Canonical bytes, once finalized.
    pub fn raw_data(&self) -> Option<&[u8]> {
        self.block.as_ref().map(|b| b.raw.as_slice())
    }

    pub fn is_finalized(&self) -> bool {
        self.block.is_some()
    }

    /// Summary for structured logs.
    pub fn loggable(&self) -> serde_json::Value {
        json!({ "type": self.name, "version": self.version() })
    }

    /// Populate from caller input.
    ///
    /// `null` on an optional key counts as absent. The input may not carry
    /// the context key.
    pub fn set_data(&mut self, input: RawMap) -> RecordResult<()> {
        if input.contains_key(CONTEXT_KEY) {
            return Err(RecordError::ValidationFailed {
                target: self.to_string(),
                reason: format!("{CONTEXT_KEY:?} is derived from the schema and cannot be set"),
            });
        }
        self.populate(input, |field, value, bound| field.set(value, bound))
    }

    /// Populate from a canonical map, checking its context against this
    /// record's schema version.
    pub fn decode(&mut self, mut raw: RawMap) -> RecordResult<()> {
        self.ensure_unbound()?;
        let context = raw
            .remove(CONTEXT_KEY)
            .ok_or_else(|| RecordError::MissingRequiredField {
                key: CONTEXT_KEY.to_string(),
            })?;
        self.context.decode(&context, &mut RawMap::new())?;
        self.populate(raw, |field, value, bound| field.decode(value, bound))
    }

    fn ensure_unbound(&self) -> RecordResult<()> {
        if self.data.is_some() {
            return Err(RecordError::AlreadyFinalized(self.to_string()));
        }
        Ok(())
    }

    fn populate<F>(&mut self, input: RawMap, apply: F) -> RecordResult<()>
    where
        F: FnMut(&mut dyn Field, &Value, &mut RawMap) -> RecordResult<()>,
    {
        self.ensure_unbound()?;
        let result = self.bind(input, apply);
        if result.is_err() {
            self.data = None;
            self.custom.clear();
        }
        result
    }

    fn bind<F>(&mut self, mut input: RawMap, mut apply: F) -> RecordResult<()>
    where
        F: FnMut(&mut dyn Field, &Value, &mut RawMap) -> RecordResult<()>,
    {
        let mut bound = RawMap::new();
        for field in &mut self.fields {
            // Start from a blank handler so a failed earlier attempt leaves
            // nothing behind.
            *field = field.prototype();
            match input.remove(field.key()) {
                Some(value) if !value.is_null() => apply(field.as_mut(), &value, &mut bound)?,
                Some(_) | None if field.is_required() => {
                    return Err(RecordError::MissingRequiredField {
                        key: field.key().to_string(),
                    })
                }
                _ => {}
            }
        }
        for field in &self.fields {
            field.validate(&bound)?;
        }
        self.custom = input;
        self.data = Some(bound);
        if let Some(validator) = self.validator {
            validator(self)?;
        }
        Ok(())
    }

    fn is_present(&self, key: &str) -> bool {
        self.data.as_ref().is_some_and(|d| d.contains_key(key))
    }

    fn bound(&self) -> RecordResult<&RawMap> {
        self.data
            .as_ref()
            .ok_or_else(|| RecordError::Invariant(format!("{self}: data is not set")))
    }

    /// The map whose canonical bytes define this record's identity: custom
    /// keys, then context and every present schema field on top.
    pub fn canonical_map(&self) -> RecordResult<RawMap> {
        self.bound()?;
        let mut map = self.custom.clone();
        self.context.encode(&mut map)?;
        for field in &self.fields {
            if field.is_required() || self.is_present(field.key()) {
                field.encode(&mut map)?;
            }
        }
        Ok(map)
    }

    /// Finalize: compute and cache the canonical bytes and identifier.
    pub fn encode(&mut self) -> RecordResult<&Cid> {
        if self.block.is_none() {
            let raw = canonical::to_bytes(&self.canonical_map()?)?;
            let cid = self.hasher.cid(self.codec, &raw);
            debug!(
                kind = %self.name,
                version = self.version(),
                cid = %cid,
                size = raw.len(),
                "record finalized"
            );
            self.block = Some(Block { cid, raw });
        }
        self.cid()
            .ok_or_else(|| RecordError::Invariant(format!("{self}: block missing after encode")))
    }

    /// Ordered JSON projection: context, schema fields in declared order,
    /// then custom keys.
    pub fn to_json_map(&self) -> RecordResult<JsonMap> {
        self.bound()?;
        let mut out = JsonMap::new();
        self.context.to_json(&mut out)?;
        for field in &self.fields {
            if self.is_present(field.key()) {
                field.to_json(&mut out)?;
            } else if field.is_required() {
                return Err(RecordError::unset(field.key()));
            }
        }
        for (key, value) in &self.custom {
            out.insert(key.clone(), value_to_json(value));
        }
        Ok(out)
    }

    pub fn to_json(&self) -> RecordResult<serde_json::Value> {
        self.to_json_map().map(serde_json::Value::Object)
    }

    /// Bound schema values and custom keys as one interchange map.
    pub fn to_value(&self) -> Value {
        let mut map = self.custom.clone();
        if let Some(data) = &self.data {
            map.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Value::Map(map)
    }

    /// Walk `path` through this record, stopping at the first link.
    pub fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Resolved::Record(self));
        };
        trace!(record = %self, key = *first, "resolve");

        if *first == CONTEXT_KEY {
            return self.context.resolve(rest);
        }
        if let Some(field) = self.field(first) {
            if !self.is_present(first) {
                if field.is_required() {
                    return Err(RecordError::unset(first));
                }
                return Err(RecordError::NoSuchLink(first.to_string()));
            }
            return field.resolve(rest);
        }
        if let Some(value) = self.custom.get(*first) {
            return resolve_raw(first, value, rest);
        }
        Err(RecordError::PathResolution(format!(
            "{first:?} is not a key of {self}"
        )))
    }

    /// Resolve a slash-separated path such as `stakeholders/0/stakeholder`.
    pub fn resolve_path(&self, path: &str) -> RecordResult<Resolved<'_>> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.resolve(&segments)
    }

    /// Resolve `path` and require the result to be a link.
    pub fn resolve_link(&self, path: &[&str]) -> RecordResult<(Cid, Vec<String>)> {
        match self.resolve(path)? {
            Resolved::Link { cid, rest } => Ok((cid, rest)),
            _ => Err(RecordError::PathResolution(
                "resolved item was not a link".to_string(),
            )),
        }
    }

    /// Every Merkle link held by a present schema field.
    pub fn links(&self) -> Vec<Link> {
        let mut out = Vec::new();
        self.collect_links("", &mut out);
        out
    }

    pub(crate) fn collect_links(&self, prefix: &str, out: &mut Vec<Link>) {
        for field in &self.fields {
            if self.is_present(field.key()) {
                field.links(&join_path(prefix, field.key()), out);
            }
        }
    }

    /// Paths below `prefix`, relative to it, at most `depth` segments deep.
    /// A negative depth lists everything; `("", -1)` lists the whole record.
    pub fn tree(&self, prefix: &str, depth: i32) -> Vec<String> {
        let mut all = Vec::new();
        self.collect_paths("", &mut all);
        let prefix = prefix.trim_matches('/');
        all.into_iter()
            .filter_map(|path| {
                let relative = if prefix.is_empty() {
                    path
                } else {
                    path.strip_prefix(prefix)?.strip_prefix('/')?.to_string()
                };
                let within = usize::try_from(depth)
                    .map_or(true, |max| relative.split('/').count() <= max);
                within.then_some(relative)
            })
            .collect()
    }

    pub(crate) fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        out.push(join_path(prefix, CONTEXT_KEY));
        for field in &self.fields {
            if self.is_present(field.key()) {
                let path = join_path(prefix, field.key());
                out.push(path.clone());
                field.tree(&path, out);
            }
        }
        for key in self.custom.keys() {
            out.push(join_path(prefix, key));
        }
    }

    /// Bound value of a schema field or custom key.
    pub fn get(&self, key: &str) -> RecordResult<&Value> {
        self.data
            .as_ref()
            .and_then(|d| d.get(key))
            .or_else(|| self.custom.get(key))
            .ok_or_else(|| RecordError::PathResolution(format!("{key} is not found")))
    }

    fn get_int<T: TryFrom<i128>>(&self, key: &str, expected: &'static str) -> RecordResult<T> {
        let value = self.get(key)?;
        value
            .as_i128()
            .and_then(|n| T::try_from(n).ok())
            .ok_or_else(|| RecordError::type_mismatch(key, expected, value.type_name()))
    }

    pub fn get_i32(&self, key: &str) -> RecordResult<i32> {
        self.get_int(key, "int32")
    }

    pub fn get_u32(&self, key: &str) -> RecordResult<u32> {
        self.get_int(key, "uint32")
    }

    pub fn get_i64(&self, key: &str) -> RecordResult<i64> {
        self.get_int(key, "int64")
    }

    pub fn get_u64(&self, key: &str) -> RecordResult<u64> {
        self.get_int(key, "uint64")
    }

    pub fn get_str(&self, key: &str) -> RecordResult<&str> {
        let value = self.get(key)?;
        value
            .as_str()
            .ok_or_else(|| RecordError::type_mismatch(key, "string", value.type_name()))
    }

    pub fn get_bytes(&self, key: &str) -> RecordResult<&[u8]> {
        let value = self.get(key)?;
        value
            .as_bytes()
            .ok_or_else(|| RecordError::type_mismatch(key, "bytes", value.type_name()))
    }

    pub fn get_array(&self, key: &str) -> RecordResult<&[Value]> {
        let value = self.get(key)?;
        value
            .as_array()
            .ok_or_else(|| RecordError::type_mismatch(key, "array", value.type_name()))
    }

    pub fn get_cid(&self, key: &str) -> RecordResult<&Cid> {
        let value = self.get(key)?;
        value
            .as_link()
            .ok_or_else(|| RecordError::type_mismatch(key, "link", value.type_name()))
    }
}

/// Resolution through untyped custom values.
fn resolve_raw<'a>(key: &str, value: &Value, path: &[&str]) -> RecordResult<Resolved<'a>> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(match value {
            Value::Link(cid) => Resolved::Link {
                cid: cid.clone(),
                rest: Vec::new(),
            },
            other => Resolved::Value(other.clone()),
        });
    };
    match value {
        Value::Link(cid) => Ok(Resolved::Link {
            cid: cid.clone(),
            rest: path.iter().map(|s| s.to_string()).collect(),
        }),
        Value::Map(map) => match map.get(*first) {
            Some(next) => resolve_raw(first, next, rest),
            None => Err(RecordError::PathResolution(format!(
                "{first:?} is not a key of {key:?}"
            ))),
        },
        Value::Array(items) => {
            let item = first
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .ok_or_else(|| {
                    RecordError::PathResolution(format!("index {first} does not exist"))
                })?;
            resolve_raw(first, item, rest)
        }
        _ => Err(RecordError::PathResolution(format!(
            "unexpected path element {first:?} past {key:?}"
        ))),
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} (v{})>", self.name, self.version())
    }
}
