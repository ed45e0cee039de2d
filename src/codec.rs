//! Serialization codec: host values to persisted payloads and back.
//!
//! [`Bridge::prepare_for_persist`] classifies a value, first match wins:
//!
//! 1. the lookup registry wants it indirected: store it, persist the token
//! 2. a registered component owns it: persist that component's own form
//! 3. it is callable: persist its source text
//! 4. otherwise: persist the safe serializer's text, or the host string
//!    if serialization fails
//!
//! [`Bridge::reconstruct`] undoes the same classes in the same order and
//! never fails: a payload that cannot be rebuilt yields `null`.

use std::any::Any;

use serde_json::{json, Map, Value as Json};
use tracing::{debug, warn};

use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::registry::Token;
use crate::serializer;
use crate::value::foreign::NestedJson;
use crate::value::{ForeignValue, HostFunction, MissingReference, Value};
use crate::wrapper::Wrapper;

const REF_KEY: &str = "_ref";
const NESTED_KEY: &str = "_nestedCustom";
const TYPE_ID_KEY: &str = "typeId";
const DATA_KEY: &str = "data";
const FUNCTION_KEY: &str = "_functionSource";
const JSON_KEY: &str = "_json";
const STRING_KEY: &str = "_string";

/// Key of the payload inside a persisted wrapper record.
pub const WRAPPED_KEY: &str = "wrapped";

/// Persisted form of one value. Exactly one shape per payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Indirection through the lookup registry.
    Reference(Token),
    /// Another component's own serialized form.
    Delegated { type_id: String, data: Json },
    /// Source text of a callable.
    FunctionSource(String),
    /// Safe-serializer text.
    Inline(String),
    /// Host string of a value that could not be serialized.
    Fallback(String),
}

impl Payload {
    pub fn to_json(&self) -> Json {
        match self {
            Payload::Reference(token) => json!({ REF_KEY: token.as_str() }),
            Payload::Delegated { type_id, data } => json!({
                NESTED_KEY: true,
                TYPE_ID_KEY: type_id,
                DATA_KEY: data,
            }),
            Payload::FunctionSource(source) => json!({ FUNCTION_KEY: source }),
            Payload::Inline(text) => json!({ JSON_KEY: text }),
            Payload::Fallback(text) => json!({ STRING_KEY: text }),
        }
    }

    /// Decode a persisted payload, checking the tags in priority order:
    /// reference, delegated, function source, inline, fallback.
    pub fn from_json(json: &Json) -> BridgeResult<Payload> {
        let Json::Object(map) = json else {
            return Err(BridgeError::BadPayload(format!("expected an object, got {}", json)));
        };
        if let Some(token) = string_field(map, REF_KEY) {
            return Ok(Payload::Reference(Token::from(token)));
        }
        let nested = map.get(NESTED_KEY).map(truthy).unwrap_or(false);
        if let (true, Some(type_id)) = (nested, string_field(map, TYPE_ID_KEY)) {
            return Ok(Payload::Delegated {
                type_id: type_id.to_string(),
                data: map.get(DATA_KEY).cloned().unwrap_or(Json::Null),
            });
        }
        if let Some(source) = string_field(map, FUNCTION_KEY) {
            return Ok(Payload::FunctionSource(source.to_string()));
        }
        if let Some(text) = string_field(map, JSON_KEY) {
            return Ok(Payload::Inline(text.to_string()));
        }
        if let Some(text) = string_field(map, STRING_KEY) {
            return Ok(Payload::Fallback(text.to_string()));
        }
        Err(BridgeError::BadPayload("no recognized payload tag".to_string()))
    }
}

fn string_field<'a>(map: &'a Map<String, Json>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Json::as_str)
}

fn truthy(json: &Json) -> bool {
    match json {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Json::String(s) => !s.is_empty(),
        Json::Array(_) | Json::Object(_) => true,
    }
}

/// Display and persistence contract shared by everything the bridge
/// hands to other components.
pub trait Opaque {
    fn to_display_string(&self) -> String;
    fn to_persistable_form(&self, bridge: &mut Bridge) -> Payload;
}

impl Opaque for Wrapper {
    fn to_display_string(&self) -> String {
        Wrapper::to_display_string(self)
    }

    fn to_persistable_form(&self, bridge: &mut Bridge) -> Payload {
        bridge.prepare_for_persist(self.inner())
    }
}

/// Type tag of reference markers.
pub const REFERENCE_MARKER_TAG: &str = "jsObjectRef";

/// Stand-in handed out instead of a value that was indirected on export.
/// Shows the display label of the value it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMarker {
    token: Token,
    label: String,
}

impl ReferenceMarker {
    pub fn new(token: Token, label: String) -> Self {
        ReferenceMarker { token, label }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }
}

impl Opaque for ReferenceMarker {
    fn to_display_string(&self) -> String {
        self.label.clone()
    }

    fn to_persistable_form(&self, _bridge: &mut Bridge) -> Payload {
        Payload::Reference(self.token.clone())
    }
}

impl ForeignValue for ReferenceMarker {
    fn type_tag(&self) -> &str {
        REFERENCE_MARKER_TAG
    }

    fn display(&self) -> BridgeResult<String> {
        Ok(self.label.clone())
    }

    fn to_json(&self, _nested: &mut NestedJson<'_>) -> BridgeResult<Json> {
        Ok(json!({ REF_KEY: self.token.as_str() }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Result of [`Bridge::export`].
#[derive(Debug, Clone)]
pub enum Exported {
    Direct(Wrapper),
    Marker(ReferenceMarker),
}

impl Exported {
    pub fn is_marker(&self) -> bool {
        matches!(self, Exported::Marker(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            Exported::Direct(wrapper) => wrapper.into_value(),
            Exported::Marker(marker) => Value::foreign(marker),
        }
    }
}

impl Opaque for Exported {
    fn to_display_string(&self) -> String {
        match self {
            Exported::Direct(wrapper) => wrapper.to_display_string(),
            Exported::Marker(marker) => Opaque::to_display_string(marker),
        }
    }

    fn to_persistable_form(&self, bridge: &mut Bridge) -> Payload {
        match self {
            Exported::Direct(wrapper) => wrapper.to_persistable_form(bridge),
            Exported::Marker(marker) => marker.to_persistable_form(bridge),
        }
    }
}

/// Unwrap wrappers so classification sees the host value itself.
fn flatten(raw: &Value) -> Value {
    match raw.downcast_foreign::<Wrapper>() {
        Some(wrapper) => wrapper.inner().clone(),
        None => raw.clone(),
    }
}

/// Token carried by a value that already stands in for an indirected one:
/// an exported marker or an unresolved placeholder.
fn standing_token(raw: &Value) -> Option<Token> {
    if let Some(marker) = raw.downcast_foreign::<ReferenceMarker>() {
        return Some(marker.token().clone());
    }
    raw.downcast_foreign::<MissingReference>()
        .map(|missing| missing.token.clone())
}

impl Bridge {
    /// Classify `raw` and produce its persisted form. Markers and
    /// unresolved placeholders keep the token they carry.
    pub fn prepare_for_persist(&mut self, raw: &Value) -> Payload {
        let raw = flatten(raw);

        if let Some(token) = standing_token(&raw) {
            return Payload::Reference(token);
        }

        if self.registry().should_indirect(&raw) {
            let token = self.registry_mut().store(Wrapper::to_type(raw));
            return Payload::Reference(token);
        }

        if let (Some(component), Some(foreign)) = (self.components().owner_of(&raw), raw.as_foreign()) {
            match component.serialize(&**foreign) {
                Ok(data) => {
                    return Payload::Delegated {
                        type_id: component.type_tag().to_string(),
                        data,
                    }
                }
                Err(err) => debug!(%err, tag = component.type_tag(), "component codec failed"),
            }
        }

        if let Value::Function(function) = &raw {
            return Payload::FunctionSource(function.source().to_string());
        }

        match serializer::serialize_with_indent(&raw, self.config().indent_width) {
            Ok(text) => Payload::Inline(text),
            Err(_) => Payload::Fallback(raw.to_host_string()),
        }
    }

    /// Rebuild a value from its payload. Failures are logged and give
    /// `null`.
    pub fn reconstruct(&self, payload: &Payload) -> Value {
        self.try_reconstruct(payload).unwrap_or_else(|err| {
            warn!(%err, "failed to reconstruct value");
            Value::Null
        })
    }

    fn try_reconstruct(&self, payload: &Payload) -> BridgeResult<Value> {
        match payload {
            Payload::Reference(token) => Ok(match self.registry().resolve(token.as_str()) {
                Some(wrapper) => wrapper.into_inner(),
                None => {
                    warn!(%token, "unresolved reference");
                    Value::foreign(MissingReference::new(token.clone()))
                }
            }),
            Payload::Delegated { type_id, data } => {
                self.components().require(type_id)?.deserialize(data)
            }
            Payload::FunctionSource(source) => Ok(Value::function(HostFunction::restored(source))),
            Payload::Inline(text) => Ok(serializer::deserialize(text).unwrap_or_else(|err| {
                debug!(%err, "inline payload is not JSON, keeping text");
                Value::string(text)
            })),
            Payload::Fallback(text) => Ok(Value::string(text)),
        }
    }

    /// Persisted record of a wrapper: `{"wrapped": <payload>}`.
    pub fn serialize(&mut self, wrapper: &Wrapper) -> Json {
        let payload = self.prepare_for_persist(wrapper.inner());
        json!({ WRAPPED_KEY: payload.to_json() })
    }

    /// Inverse of [`serialize`](Self::serialize). Records that are not
    /// objects give `None`; a record whose payload cannot be decoded
    /// gives a wrapper around `null`.
    pub fn deserialize(&self, record: &Json) -> Option<Wrapper> {
        let Json::Object(map) = record else {
            return None;
        };
        let payload = map
            .get(WRAPPED_KEY)
            .ok_or_else(|| BridgeError::BadPayload("missing 'wrapped'".to_string()))
            .and_then(Payload::from_json);
        match payload {
            Ok(payload) => Some(Wrapper::to_type(self.reconstruct(&payload))),
            Err(err) => {
                warn!(%err, "unreadable wrapper record");
                Some(Wrapper::null())
            }
        }
    }

    /// Prepare a wrapper for another component. Values the registry
    /// would indirect are stored and replaced by a reference marker.
    pub fn export(&mut self, wrapper: Wrapper) -> Exported {
        if !self.registry().should_indirect(wrapper.inner()) {
            return Exported::Direct(wrapper);
        }
        let label = wrapper.to_display_string();
        let token = self.registry_mut().store(wrapper);
        Exported::Marker(ReferenceMarker::new(token, label))
    }

    /// Bring an incoming block-layer value into a wrapper: markers are
    /// resolved, registered component values unwrapped into host values,
    /// and wrappers flattened.
    pub fn normalize(&self, raw: &Value) -> Wrapper {
        if let Some(marker) = raw.downcast_foreign::<ReferenceMarker>() {
            return self
                .registry()
                .resolve(marker.token().as_str())
                .unwrap_or_else(|| {
                    Wrapper::to_type(Value::foreign(MissingReference::new(marker.token().clone())))
                });
        }
        if let (Some(component), Some(foreign)) = (self.components().owner_of(raw), raw.as_foreign()) {
            match component.unwrap(&**foreign) {
                Ok(value) => return Wrapper::to_type(value),
                Err(err) => warn!(%err, tag = component.type_tag(), "component unwrap failed"),
            }
        }
        Wrapper::to_type(raw.clone())
    }
}
