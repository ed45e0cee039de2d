//! The opaque value wrapper handed to the block layer.
//!
//! A [`Wrapper`] holds exactly one host value and only offers safe views
//! of it: a bounded display label, a JSON projection, a debug dump.
//! Wrappers never nest; [`Wrapper::to_type`] flattens. Inside a host
//! value graph a wrapper travels as a foreign value tagged
//! [`WRAPPER_TAG`], which is how previously wrapped values come back.

use std::any::Any;
use std::fmt;

use serde_json::Value as Json;

use crate::error::{BridgeError, BridgeResult};
use crate::serializer;
use crate::value::foreign::NestedJson;
use crate::value::{format_number, ForeignValue, HostObject, Value};

/// Type tag of wrapped values.
pub const WRAPPER_TAG: &str = "jsObject";

/// Display label used when rendering a value fails.
pub const UNPRINTABLE: &str = "[unprintable]";

#[derive(Clone)]
pub struct Wrapper {
    inner: Value,
}

impl Wrapper {
    /// Coerce anything into a wrapper. An existing wrapper is returned
    /// as-is (sharing its inner value); other components' opaque values
    /// are wrapped without being unpacked.
    pub fn to_type(raw: Value) -> Wrapper {
        if let Some(existing) = raw.downcast_foreign::<Wrapper>() {
            return existing.clone();
        }
        Wrapper { inner: raw }
    }

    pub fn new(raw: Value) -> Wrapper {
        Self::to_type(raw)
    }

    pub fn undefined() -> Wrapper {
        Wrapper {
            inner: Value::Undefined,
        }
    }

    pub fn null() -> Wrapper {
        Wrapper { inner: Value::Null }
    }

    /// Error value returned to the block layer in place of a failure.
    pub fn from_error(err: &BridgeError) -> Wrapper {
        Wrapper {
            inner: Value::object(HostObject::error(err.name(), &err.message())),
        }
    }

    pub fn inner(&self) -> &Value {
        &self.inner
    }

    pub fn into_inner(self) -> Value {
        self.inner
    }

    /// Put the wrapper itself into a host value graph.
    pub fn into_value(self) -> Value {
        Value::foreign(self)
    }

    pub fn is_error(&self) -> bool {
        self.inner
            .as_object()
            .map(|object| object.is_error())
            .unwrap_or(false)
    }

    /// Short label for the block layer. Never fails; anything that goes
    /// wrong while rendering yields [`UNPRINTABLE`].
    pub fn to_display_string(&self) -> String {
        self.try_display()
            .unwrap_or_else(|_| UNPRINTABLE.to_string())
    }

    pub fn try_display(&self) -> BridgeResult<String> {
        Ok(match &self.inner {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::String(s) => s.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            Value::BigInt(n) => n.to_string(),
            Value::Function(function) => format!(
                "[Function {}]",
                function
                    .name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or("anonymous")
            ),
            Value::Array(items) => {
                let len = items
                    .try_borrow()
                    .map_err(|_| BridgeError::type_error("array is being mutated"))?
                    .len();
                format!("[Array({})]", len)
            }
            Value::Object(object) => format!("[{}]", object.constructor_name()?),
            Value::Foreign(foreign) => foreign.display()?,
        })
    }

    /// JSON projection: primitives as themselves, callables as source
    /// text, composites through the safe serializer, and the host string
    /// as a last resort.
    pub fn to_json(&self) -> Json {
        serializer::project_wrapped(&self.inner)
            .unwrap_or_else(|_| Json::String(self.inner.to_host_string()))
    }

    /// Indented dump for inspection.
    pub fn to_debug_string(&self) -> String {
        if let Value::Undefined = self.inner {
            return "undefined".to_string();
        }
        serializer::project_wrapped(&self.inner)
            .and_then(|json| serializer::write_json(&json, serializer::DEFAULT_INDENT))
            .unwrap_or_else(|_| self.inner.to_host_string())
    }

    /// Text shown in a list-editor cell: strings raw, everything else as
    /// compact JSON.
    pub fn to_list_editor(&self) -> String {
        match &self.inner {
            Value::String(s) => s.to_string(),
            _ => serializer::write_json(&self.to_json(), 0)
                .unwrap_or_else(|_| self.inner.to_host_string()),
        }
    }

    /// Inverse of [`to_list_editor`](Self::to_list_editor): JSON text
    /// becomes the value it denotes, anything else stays a string.
    pub fn from_list_editor(text: &str) -> Wrapper {
        match serializer::deserialize(text) {
            Ok(value) => Wrapper::to_type(value),
            Err(_) => Wrapper::to_type(Value::string(text)),
        }
    }

    /// `typeof`, refined so that `null` and arrays are named as such and
    /// foreign values report their tag.
    pub fn type_name(&self) -> String {
        match &self.inner {
            Value::Null => "null".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Foreign(foreign) => foreign.type_tag().to_string(),
            other => other.type_of().to_string(),
        }
    }
}

impl From<Value> for Wrapper {
    fn from(value: Value) -> Self {
        Wrapper::to_type(value)
    }
}

impl PartialEq for Wrapper {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl ForeignValue for Wrapper {
    fn type_tag(&self) -> &str {
        WRAPPER_TAG
    }

    fn display(&self) -> BridgeResult<String> {
        Ok(self.to_display_string())
    }

    fn to_json(&self, nested: &mut NestedJson<'_>) -> BridgeResult<Json> {
        match &self.inner {
            Value::Function(function) => Ok(Json::String(function.source().to_string())),
            other => nested(other),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Wrapper").field(&self.inner).finish()
    }
}
