//! Component registry: codecs for other components' opaque values.
//!
//! Each component that hands opaque values to the bridge registers a
//! [`Component`] under its type tag at load time. The codec looks the
//! component up by tag when it meets a foreign value, instead of guessing
//! at the value's shape.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::Value as Json;
use tracing::debug;

use crate::companion::{ListComponent, RecordComponent};
use crate::error::{BridgeError, BridgeResult};
use crate::value::{ForeignValue, Value};

/// Conversion contract of a component's opaque value type.
pub trait Component {
    /// Type tag carried by this component's values.
    fn type_tag(&self) -> &str;

    /// Build this component's opaque value from a host value.
    ///
    /// # Returns
    /// * `Ok(Value::Foreign(..))` - the component's own representation
    /// * `Err(BridgeError)` - the host value has no such representation
    fn wrap(&self, value: &Value) -> BridgeResult<Value>;

    /// Convert one of this component's values back to a plain host value.
    fn unwrap(&self, value: &dyn ForeignValue) -> BridgeResult<Value>;

    /// Persisted form of one of this component's values.
    fn serialize(&self, value: &dyn ForeignValue) -> BridgeResult<Json>;

    /// Rebuild a value from what [`serialize`](Self::serialize) produced.
    fn deserialize(&self, data: &Json) -> BridgeResult<Value>;
}

/// Type tag to component.
#[derive(Default)]
pub struct ComponentRegistry {
    components: FxHashMap<String, Rc<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the companion list and record components.
    pub fn with_companions() -> Self {
        let mut registry = Self::new();
        registry.register(Rc::new(ListComponent));
        registry.register(Rc::new(RecordComponent));
        registry
    }

    /// Register a component under its type tag, replacing and returning
    /// any component previously registered for that tag.
    pub fn register(&mut self, component: Rc<dyn Component>) -> Option<Rc<dyn Component>> {
        let tag = component.type_tag().to_string();
        debug!(tag = tag.as_str(), "registered component");
        self.components.insert(tag, component)
    }

    pub fn unregister(&mut self, tag: &str) -> Option<Rc<dyn Component>> {
        self.components.remove(tag)
    }

    pub fn get(&self, tag: &str) -> Option<Rc<dyn Component>> {
        self.components.get(tag).cloned()
    }

    /// Like [`get`](Self::get), failing with `UnknownComponent`.
    pub fn require(&self, tag: &str) -> BridgeResult<Rc<dyn Component>> {
        self.get(tag)
            .ok_or_else(|| BridgeError::UnknownComponent(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.components.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.components.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Component owning `value`, if it is a foreign value with a
    /// registered tag.
    pub fn owner_of(&self, value: &Value) -> Option<Rc<dyn Component>> {
        value
            .as_foreign()
            .and_then(|foreign| self.get(foreign.type_tag()))
    }
}
