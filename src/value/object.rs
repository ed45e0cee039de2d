//! Host objects: ordered property bags with a kind and a constructor name.

use std::cell::RefCell;
use std::rc::Rc;

use super::Value;
use crate::error::{BridgeError, BridgeResult};

pub type ObjectRef = Rc<HostObject>;

/// Property accessor. Host getters may raise, which is how hostile
/// objects break traversal.
pub type Getter = Rc<dyn Fn() -> BridgeResult<Value>>;

#[derive(Clone)]
pub enum Property {
    Data(Value),
    Accessor(Getter),
}

/// Settlement state of a pending-computation object.
#[derive(Debug, Clone)]
pub enum PromiseState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

/// What sort of object this is, beyond its properties.
pub enum ObjectKind {
    Plain,
    /// Built-in namespace such as `Math` or `console`.
    Namespace,
    Map,
    Set,
    WeakMap,
    WeakSet,
    Promise(RefCell<PromiseState>),
    Error,
    /// Node of an externally-owned UI tree.
    Node,
}

impl ObjectKind {
    /// Kinds that never survive a trip through text: keyed collections,
    /// pending computations, errors and foreign UI nodes.
    pub fn is_problematic(&self) -> bool {
        matches!(
            self,
            ObjectKind::Map
                | ObjectKind::Set
                | ObjectKind::WeakMap
                | ObjectKind::WeakSet
                | ObjectKind::Promise(_)
                | ObjectKind::Error
                | ObjectKind::Node
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Plain => "plain",
            ObjectKind::Namespace => "namespace",
            ObjectKind::Map => "map",
            ObjectKind::Set => "set",
            ObjectKind::WeakMap => "weakmap",
            ObjectKind::WeakSet => "weakset",
            ObjectKind::Promise(_) => "promise",
            ObjectKind::Error => "error",
            ObjectKind::Node => "node",
        }
    }
}

pub struct HostObject {
    kind: ObjectKind,
    class_name: Rc<str>,
    properties: RefCell<Vec<(Rc<str>, Property)>>,
}

impl HostObject {
    pub fn new(kind: ObjectKind, class_name: &str) -> Self {
        HostObject {
            kind,
            class_name: Rc::from(class_name),
            properties: RefCell::new(Vec::new()),
        }
    }

    /// An empty object made by the `Object` constructor.
    pub fn plain() -> Self {
        Self::new(ObjectKind::Plain, "Object")
    }

    /// An instance of a user-defined class.
    pub fn instance(class_name: &str) -> Self {
        Self::new(ObjectKind::Plain, class_name)
    }

    pub fn error(name: &str, message: &str) -> Self {
        let object = Self::new(ObjectKind::Error, name);
        object.define("name", Property::Data(Value::string(name)));
        object.define("message", Property::Data(Value::string(message)));
        object
    }

    pub fn promise(state: PromiseState) -> Self {
        Self::new(ObjectKind::Promise(RefCell::new(state)), "Promise")
    }

    pub fn with_property(self, key: &str, value: Value) -> Self {
        self.define(key, Property::Data(value));
        self
    }

    pub fn with_getter(self, key: &str, getter: impl Fn() -> BridgeResult<Value> + 'static) -> Self {
        self.define(key, Property::Accessor(Rc::new(getter)));
        self
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Constructor name, honouring an own `constructor` property.
    pub fn constructor_name(&self) -> BridgeResult<Rc<str>> {
        let ctor = match self.get_own("constructor") {
            Some(Property::Data(value)) => value,
            Some(Property::Accessor(getter)) => getter()?,
            None => return Ok(self.class_name.clone()),
        };
        Ok(ctor
            .as_function()
            .and_then(|function| function.name())
            .filter(|name| !name.is_empty())
            .map(Rc::from)
            .unwrap_or_else(|| self.class_name.clone()))
    }

    /// Insert or replace a property definition.
    pub fn define(&self, key: &str, property: Property) {
        let mut props = self.properties.borrow_mut();
        match props.iter_mut().find(|(k, _)| k.as_ref() == key) {
            Some((_, slot)) => *slot = property,
            None => props.push((Rc::from(key), property)),
        }
    }

    pub fn get_own(&self, key: &str) -> Option<Property> {
        self.properties
            .try_borrow()
            .ok()?
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, p)| p.clone())
    }

    /// Read a property, running its getter if it has one.
    pub fn get(&self, key: &str) -> BridgeResult<Value> {
        // The borrow is released before the getter runs.
        match self.get_own(key) {
            Some(Property::Data(value)) => Ok(value),
            Some(Property::Accessor(getter)) => getter(),
            None => Ok(Value::Undefined),
        }
    }

    pub fn set(&self, key: &str, value: Value) -> BridgeResult<()> {
        if let Some(Property::Accessor(_)) = self.get_own(key) {
            return Err(BridgeError::type_error(format!(
                "Cannot set property {} of [{}] which has only a getter",
                key, self.class_name
            )));
        }
        let mut props = self
            .properties
            .try_borrow_mut()
            .map_err(|_| BridgeError::type_error("object is being read"))?;
        match props.iter_mut().find(|(k, _)| k.as_ref() == key) {
            Some((_, slot)) => *slot = Property::Data(value),
            None => props.push((Rc::from(key), Property::Data(value))),
        }
        Ok(())
    }

    /// Remove an own property. Gives `None` when it is absent or the
    /// object is borrowed.
    pub fn remove(&self, key: &str) -> Option<Property> {
        let mut props = self.properties.try_borrow_mut().ok()?;
        let index = props.iter().position(|(k, _)| k.as_ref() == key)?;
        Some(props.remove(index).1)
    }

    pub fn keys(&self) -> Vec<Rc<str>> {
        self.properties
            .borrow()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Snapshot of all own properties, so callers can run getters without
    /// holding a borrow on the object.
    pub fn properties(&self) -> BridgeResult<Vec<(Rc<str>, Property)>> {
        self.properties
            .try_borrow()
            .map(|props| props.clone())
            .map_err(|_| BridgeError::type_error("object is being mutated"))
    }

    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn promise_state(&self) -> Option<PromiseState> {
        match &self.kind {
            ObjectKind::Promise(state) => Some(state.borrow().clone()),
            _ => None,
        }
    }

    /// Settle a pending promise. Returns false if it was already settled
    /// or this is not a promise.
    pub fn settle(&self, outcome: PromiseState) -> bool {
        match &self.kind {
            ObjectKind::Promise(state) => {
                let mut state = state.borrow_mut();
                if matches!(*state, PromiseState::Pending) {
                    *state = outcome;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ObjectKind::Error)
    }
}
