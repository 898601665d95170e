use crate::error::{RecordError, RecordResult};
use crate::field::{join_path, Field, FieldSpec, Link, Resolved};
use crate::json::JsonMap;
use crate::value::{RawMap, Value};

/// Homogeneous array. Every element is handled by a fresh copy of the
/// element prototype; element errors carry their index.
#[derive(Debug)]
pub struct ArrayField {
    spec: FieldSpec,
    element: Box<dyn Field>,
    items: Vec<Box<dyn Field>>,
}

impl ArrayField {
    /// `element` is only used as a prototype; its key is irrelevant
    /// (conventionally [`ELEMENT_KEY`](crate::field::ELEMENT_KEY)).
    pub fn new(key: impl Into<String>, required: bool, element: impl Field + 'static) -> Self {
        Self {
            spec: FieldSpec::new(key, required),
            element: Box::new(element),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Box<dyn Field>] {
        &self.items
    }

    fn elements<'v>(&self, value: &'v Value) -> RecordResult<&'v [Value]> {
        value
            .as_array()
            .ok_or_else(|| RecordError::type_mismatch(self.key(), "array", value.type_name()))
    }

    /// Run `f` on a fresh element for every input, wrapping failures with
    /// the element index.
    fn fill<F>(&mut self, inputs: &[Value], mut f: F) -> RecordResult<()>
    where
        F: FnMut(&mut dyn Field, &Value) -> RecordResult<()>,
    {
        let mut items = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let mut item = self.element.prototype();
            f(item.as_mut(), input).map_err(|e| RecordError::at_index(self.key(), index, e))?;
            items.push(item);
        }
        self.items = items;
        Ok(())
    }

    /// Fill from `value` with `apply` and write the elements' bound values
    /// as one array.
    fn bind<F>(&mut self, value: &Value, out: &mut RawMap, mut apply: F) -> RecordResult<()>
    where
        F: FnMut(&mut dyn Field, &Value, &mut RawMap) -> RecordResult<()>,
    {
        let inputs = self.elements(value)?;
        let mut bound = Vec::with_capacity(inputs.len());
        self.fill(inputs, |item, input| {
            let mut slot = RawMap::new();
            apply(&mut *item, input, &mut slot)?;
            bound.push(slot.remove(item.key()).unwrap_or(Value::Null));
            Ok(())
        })?;
        out.insert(self.key().to_string(), Value::Array(bound));
        Ok(())
    }
}

impl Field for ArrayField {
    fn prototype(&self) -> Box<dyn Field> {
        Box::new(Self {
            spec: self.spec.clone(),
            element: self.element.prototype(),
            items: Vec::new(),
        })
    }

    fn key(&self) -> &str {
        self.spec.key()
    }

    fn is_required(&self) -> bool {
        self.spec.is_required()
    }

    fn set(&mut self, value: &Value, out: &mut RawMap) -> RecordResult<()> {
        self.bind(value, out, |item, input, slot| item.set(input, slot))
    }

    fn encode(&self, out: &mut RawMap) -> RecordResult<()> {
        let mut encoded = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            let mut placeholder = RawMap::new();
            item.encode(&mut placeholder)
                .map_err(|e| RecordError::at_index(self.key(), index, e))?;
            let value = placeholder
                .remove(item.key())
                .ok_or_else(|| RecordError::unset(item.key()))?;
            encoded.push(value);
        }
        out.insert(self.key().to_string(), Value::Array(encoded));
        Ok(())
    }

    fn decode(&mut self, raw: &Value, out: &mut RawMap) -> RecordResult<()> {
        self.bind(raw, out, |item, input, slot| item.decode(input, slot))
    }

    fn to_json(&self, out: &mut JsonMap) -> RecordResult<()> {
        let mut projected = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            let mut placeholder = JsonMap::new();
            item.to_json(&mut placeholder)
                .map_err(|e| RecordError::at_index(self.key(), index, e))?;
            projected.push(
                placeholder
                    .remove(item.key())
                    .unwrap_or(serde_json::Value::Null),
            );
        }
        out.insert(self.key().to_string(), serde_json::Value::Array(projected));
        Ok(())
    }

    fn resolve(&self, path: &[&str]) -> RecordResult<Resolved<'_>> {
        let Some((first, rest)) = path.split_first() else {
            let mut resolved = Vec::with_capacity(self.items.len());
            for (index, item) in self.items.iter().enumerate() {
                resolved.push(
                    item.resolve(&[])
                        .map_err(|e| RecordError::at_index(self.key(), index, e))?,
                );
            }
            return Ok(Resolved::List(resolved));
        };

        let index: usize = first.parse().map_err(|_| {
            RecordError::PathResolution(format!(
                "unexpected path element {first:?} past \"{}\"",
                self.key()
            ))
        })?;
        let item = self.items.get(index).ok_or_else(|| {
            RecordError::PathResolution(format!("index {index} does not exist"))
        })?;
        item.resolve(rest)
    }

    fn links(&self, prefix: &str, out: &mut Vec<Link>) {
        for (index, item) in self.items.iter().enumerate() {
            item.links(&join_path(prefix, &index.to_string()), out);
        }
    }

    fn tree(&self, prefix: &str, out: &mut Vec<String>) {
        for (index, item) in self.items.iter().enumerate() {
            let path = join_path(prefix, &index.to_string());
            out.push(path.clone());
            item.tree(&path, out);
        }
    }
}
