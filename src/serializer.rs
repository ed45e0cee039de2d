//! Safe serializer: host values to indented JSON text and back.
//!
//! Mirrors what the host's own stringifier does, with two differences:
//! integers too large for a host number become decimal strings instead of
//! failing, and a reference seen earlier in the traversal is replaced by
//! [`CIRCULAR_MARKER`] instead of recursing. The seen set is never pruned,
//! so shared (non-cyclic) references are marked as well.
//!
//! If a getter raises during traversal the whole call fails; callers fall
//! back to the host string of the top-level value.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value as Json;

use crate::error::{BridgeError, BridgeResult};
use crate::value::{HostObject, Property, Value, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};

/// Placeholder left where a reference repeats.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// Indentation width of the stringified form.
pub const DEFAULT_INDENT: usize = 2;
/// Wider indents are clamped, as the host's `JSON.stringify` does.
const MAX_INDENT: usize = 10;

/// Serialize with the default indentation.
pub fn serialize(value: &Value) -> BridgeResult<String> {
    serialize_with_indent(value, DEFAULT_INDENT)
}

/// Serialize with `indent` spaces per level; zero gives compact output.
///
/// Values the host stringifier skips at the top level (`undefined`,
/// functions) serialize as `null`.
pub fn serialize_with_indent(value: &Value, indent: usize) -> BridgeResult<String> {
    let json = to_json(value)?.unwrap_or(Json::Null);
    write_json(&json, indent)
}

/// Render an already-projected JSON tree.
pub fn write_json(json: &Json, indent: usize) -> BridgeResult<String> {
    if indent == 0 {
        return serde_json::to_string(json).map_err(|e| BridgeError::Serialize(e.to_string()));
    }
    let indent = " ".repeat(indent.min(MAX_INDENT));
    let mut out = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    json.serialize(&mut ser)
        .map_err(|e| BridgeError::Serialize(e.to_string()))?;
    String::from_utf8(out).map_err(|e| BridgeError::Serialize(e.to_string()))
}

/// Project a value to a JSON tree. `None` means the value has no JSON
/// form (the host omits such members from objects).
pub fn to_json(value: &Value) -> BridgeResult<Option<Json>> {
    Traversal::default().visit(value)
}

/// JSON projection of a wrapped value: like [`to_json`], except that
/// callables become their source text.
pub fn project_wrapped(inner: &Value) -> BridgeResult<Json> {
    Traversal::default().visit_wrapped(inner)
}

/// Parse serialized text back into host values.
pub fn deserialize(text: &str) -> BridgeResult<Value> {
    let json: Json = serde_json::from_str(text)?;
    Ok(from_json(&json))
}

/// Build host values from a JSON tree. Objects become plain objects,
/// keeping key order.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::string(s),
        Json::Array(items) => Value::array(items.iter().map(from_json).collect()),
        Json::Object(map) => {
            let object = HostObject::plain();
            for (key, item) in map {
                object.define(key, Property::Data(from_json(item)));
            }
            Value::object(object)
        }
    }
}

/// User-facing stringify: indented text, or the host string when the
/// value cannot be serialized.
pub fn stringify(value: &Value) -> String {
    serialize(value).unwrap_or_else(|_| value.to_host_string())
}

/// Numbers: integral values inside the safe range print without a
/// fractional part; non-finite values become `null`.
pub fn number_to_json(n: f64) -> Json {
    if !n.is_finite() {
        return Json::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER as f64 {
        return Json::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}

/// Big integers inside the safe range become numbers, anything else a
/// decimal string so no digits are lost.
pub fn bigint_to_json(n: &BigInt) -> Json {
    if *n >= BigInt::from(MIN_SAFE_INTEGER) && *n <= BigInt::from(MAX_SAFE_INTEGER) {
        if let Some(small) = n.to_i64() {
            return Json::from(small);
        }
    }
    Json::String(n.to_string())
}

#[derive(Default)]
struct Traversal {
    seen: FxHashSet<usize>,
}

impl Traversal {
    /// Record a reference; false if it was already visited.
    fn enter(&mut self, value: &Value) -> bool {
        match value.identity() {
            Some(id) => self.seen.insert(id),
            None => true,
        }
    }

    fn visit(&mut self, value: &Value) -> BridgeResult<Option<Json>> {
        match value {
            Value::Undefined | Value::Function(_) => Ok(None),
            Value::Null => Ok(Some(Json::Null)),
            Value::Bool(b) => Ok(Some(Json::Bool(*b))),
            Value::Number(n) => Ok(Some(number_to_json(*n))),
            Value::BigInt(n) => Ok(Some(bigint_to_json(n))),
            Value::String(s) => Ok(Some(Json::String(s.to_string()))),
            Value::Array(items) => {
                if !self.enter(value) {
                    return Ok(Some(Json::String(CIRCULAR_MARKER.to_string())));
                }
                let items = items
                    .try_borrow()
                    .map_err(|_| BridgeError::Serialize("array is being mutated".to_string()))?
                    .clone();
                let mut out = Vec::with_capacity(items.len());
                for item in &items {
                    out.push(self.visit(item)?.unwrap_or(Json::Null));
                }
                Ok(Some(Json::Array(out)))
            }
            Value::Object(object) => {
                if !self.enter(value) {
                    return Ok(Some(Json::String(CIRCULAR_MARKER.to_string())));
                }
                let mut map = serde_json::Map::new();
                for (key, property) in object.properties()? {
                    let member = match property {
                        Property::Data(member) => member,
                        Property::Accessor(getter) => getter()?,
                    };
                    if let Some(json) = self.visit(&member)? {
                        map.insert(key.to_string(), json);
                    }
                }
                Ok(Some(Json::Object(map)))
            }
            Value::Foreign(foreign) => {
                if !self.enter(value) {
                    return Ok(Some(Json::String(CIRCULAR_MARKER.to_string())));
                }
                let mut nested = |member: &Value| -> BridgeResult<Json> {
                    Ok(self.visit(member)?.unwrap_or(Json::Null))
                };
                foreign.to_json(&mut nested).map(Some)
            }
        }
    }

    fn visit_wrapped(&mut self, inner: &Value) -> BridgeResult<Json> {
        match inner {
            Value::Undefined => Ok(Json::Null),
            Value::Function(function) => Ok(Json::String(function.source().to_string())),
            other => Ok(self.visit(other)?.unwrap_or(Json::Null)),
        }
    }
}
