//! Opaque values owned by other components.
//!
//! A foreign value is identified only by its type tag. The bridge never
//! looks inside one except through the component registered for that tag.

use std::any::Any;

use serde_json::Value as Json;

use super::Value;
use crate::error::BridgeResult;
use crate::registry::Token;

/// Callback handed to [`ForeignValue::to_json`] for serializing host
/// values nested inside the foreign value, within the caller's traversal.
pub type NestedJson<'a> = dyn FnMut(&Value) -> BridgeResult<Json> + 'a;

pub trait ForeignValue {
    /// Type tag naming the owning component.
    fn type_tag(&self) -> &str;

    /// Short human-readable label.
    fn display(&self) -> BridgeResult<String>;

    /// Projection used when this value is nested inside something being
    /// stringified. Defaults to the display label.
    fn to_json(&self, nested: &mut NestedJson<'_>) -> BridgeResult<Json> {
        let _ = nested;
        Ok(Json::String(self.display()?))
    }

    fn as_any(&self) -> &dyn Any;
}

/// Tag of the unresolved-reference placeholder.
pub const MISSING_REFERENCE_TAG: &str = "missingReference";

/// Placeholder produced when a persisted token no longer resolves,
/// e.g. a reference saved by a different session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    pub token: Token,
}

impl MissingReference {
    pub fn new(token: Token) -> Self {
        MissingReference { token }
    }
}

impl ForeignValue for MissingReference {
    fn type_tag(&self) -> &str {
        MISSING_REFERENCE_TAG
    }

    fn display(&self) -> BridgeResult<String> {
        Ok(format!("[Missing reference {}]", self.token))
    }

    fn to_json(&self, _nested: &mut NestedJson<'_>) -> BridgeResult<Json> {
        Ok(Json::Null)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
