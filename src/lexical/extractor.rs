//! Field extraction: deciding which parts of a payload are indexable.
//!
//! An engine is constructed with one [`FieldExtractor`]. It runs both when a
//! document is indexed and when it is de-indexed, so it must be deterministic
//! and free of side effects: de-indexing relies on getting back exactly the
//! text that was indexed.
//!
//! Built-in strategies:
//!
//! - [`StructuralExtractor`]: every scalar value of the payload, recursively.
//! - [`AllowListExtractor`]: only the named fields.
//! - [`FnExtractor`]: any closure, for payloads that do not implement `Serialize`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{LumenError, Result};

/// Strategy yielding the indexable text fragments of a payload, in a fixed order.
pub trait FieldExtractor<T>: Send + Sync {
    fn extract(&self, payload: &T) -> Result<Vec<String>>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Indexes every string, number and boolean in the payload.
///
/// Payloads are walked through their `Serialize` representation. Maps are
/// visited in key order, sequences in element order; nulls contribute
/// nothing. Timestamps appear as whatever scalar their serializer emits
/// (an RFC 3339 string for `chrono` types).
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralExtractor;

impl StructuralExtractor {
    pub fn new() -> Self {
        StructuralExtractor
    }
}

impl<T: Serialize> FieldExtractor<T> for StructuralExtractor {
    fn extract(&self, payload: &T) -> Result<Vec<String>> {
        let value = to_value(payload)?;
        let mut fragments = Vec::new();
        collect_scalars(&value, &mut fragments);
        Ok(fragments)
    }

    fn name(&self) -> &str {
        "structural"
    }
}

/// Indexes only the listed fields, in list order.
///
/// A field name may be a dotted path (`meta.title`) into nested maps. Listing
/// a map or sequence field indexes every scalar inside it. Fields that are
/// absent or null contribute nothing.
#[derive(Debug, Clone)]
pub struct AllowListExtractor {
    fields: Vec<String>,
}

impl AllowListExtractor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowListExtractor {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl<T: Serialize> FieldExtractor<T> for AllowListExtractor {
    fn extract(&self, payload: &T) -> Result<Vec<String>> {
        let value = to_value(payload)?;
        if !value.is_object() {
            return Err(LumenError::invalid_input(
                "field allow-list requires a map-shaped payload",
            ));
        }

        let mut fragments = Vec::new();
        for field in &self.fields {
            if let Some(found) = lookup(&value, field) {
                collect_scalars(found, &mut fragments);
            }
        }
        Ok(fragments)
    }

    fn name(&self) -> &str {
        "allow-list"
    }
}

/// Adapts a closure into a [`FieldExtractor`].
pub struct FnExtractor<F> {
    name: String,
    f: F,
}

impl<F> FnExtractor<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnExtractor {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnExtractor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExtractor").field("name", &self.name).finish()
    }
}

impl<T, F> FieldExtractor<T> for FnExtractor<F>
where
    F: Fn(&T) -> Result<Vec<String>> + Send + Sync,
{
    fn extract(&self, payload: &T) -> Result<Vec<String>> {
        (self.f)(payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn to_value<T: Serialize>(payload: &T) -> Result<Value> {
    let value = serde_json::to_value(payload)
        .map_err(|e| LumenError::invalid_input(format!("payload is not indexable: {e}")))?;
    if value.is_null() {
        return Err(LumenError::invalid_input("payload is null"));
    }
    Ok(value)
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

fn collect_scalars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_scalars(item, out);
            }
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (_, item) in entries {
                collect_scalars(item, out);
            }
        }
    }
}
