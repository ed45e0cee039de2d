//! Host value model
//!
//! `Value` is everything the embedding host can hand to the bridge:
//! primitives, shared composites, callables, and opaque values owned by
//! other components. Reference types live behind `Rc`, so cloning a
//! `Value` never copies the underlying object and identity is pointer
//! identity. Composite graphs may be cyclic.

pub mod display;
pub mod foreign;
pub mod function;
pub mod object;

use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::error::{BridgeError, BridgeResult};

pub use display::format_number;
pub use foreign::{ForeignValue, MissingReference};
pub use function::{name_from_source, FunctionBody, FunctionRef, HostFunction, NativeFn};
pub use object::{Getter, HostObject, ObjectKind, ObjectRef, PromiseState, Property};

/// Shared, mutable element storage of a host array.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Largest integer a host number represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
/// Smallest integer a host number represents exactly.
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;
/// Longest array the bridge stores densely. Longer lengths and writes
/// past it are a `RangeError`.
pub const MAX_ARRAY_LENGTH: usize = 1 << 24;

/// A host runtime value.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Arbitrary-precision integer.
    BigInt(Rc<BigInt>),
    String(Rc<str>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(FunctionRef),
    /// Opaque value produced by another component, identified by its type tag.
    Foreign(Rc<dyn ForeignValue>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn bigint(n: impl Into<BigInt>) -> Value {
        Value::BigInt(Rc::new(n.into()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(object: HostObject) -> Value {
        Value::Object(Rc::new(object))
    }

    /// A plain `Object` with the given data properties, in order.
    pub fn plain_object<K: AsRef<str>>(props: impl IntoIterator<Item = (K, Value)>) -> Value {
        let object = HostObject::plain();
        for (key, value) in props {
            object.define(key.as_ref(), Property::Data(value));
        }
        Value::object(object)
    }

    pub fn function(function: HostFunction) -> Value {
        Value::Function(Rc::new(function))
    }

    pub fn foreign(value: impl ForeignValue + 'static) -> Value {
        Value::Foreign(Rc::new(value))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Arrays and objects: values whose structure can be traversed.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_foreign(&self) -> Option<&Rc<dyn ForeignValue>> {
        match self {
            Value::Foreign(foreign) => Some(foreign),
            _ => None,
        }
    }

    /// Downcast a foreign value to a concrete component type.
    pub fn downcast_foreign<T: 'static>(&self) -> Option<&T> {
        self.as_foreign()
            .and_then(|foreign| foreign.as_any().downcast_ref::<T>())
    }

    /// Pointer identity of reference types; `None` for primitives.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(Rc::as_ptr(items) as *const () as usize),
            Value::Object(object) => Some(Rc::as_ptr(object) as *const () as usize),
            Value::Function(function) => Some(Rc::as_ptr(function) as *const () as usize),
            Value::Foreign(foreign) => Some(Rc::as_ptr(foreign) as *const () as usize),
            _ => None,
        }
    }

    /// Host `typeof` classification.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Array(_) | Value::Object(_) | Value::Foreign(_) => "object",
        }
    }

    /// Name of the constructor that produced this value, if it has one.
    ///
    /// Objects consult an own `constructor` property first, so a hostile
    /// accessor there surfaces as an error.
    pub fn constructor_name(&self) -> BridgeResult<Option<Rc<str>>> {
        Ok(match self {
            Value::Undefined | Value::Null => None,
            Value::Bool(_) => Some(Rc::from("Boolean")),
            Value::Number(_) => Some(Rc::from("Number")),
            Value::BigInt(_) => Some(Rc::from("BigInt")),
            Value::String(_) => Some(Rc::from("String")),
            Value::Array(_) => Some(Rc::from("Array")),
            Value::Function(_) => Some(Rc::from("Function")),
            Value::Object(object) => Some(object.constructor_name()?),
            Value::Foreign(foreign) => Some(Rc::from(foreign.type_tag())),
        })
    }

    /// Host truthiness.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Host numeric conversion.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::BigInt(n) => n.to_f64().unwrap_or(f64::NAN),
            Value::String(s) => parse_numeric(s),
            Value::Array(items) => match items.try_borrow() {
                Ok(items) if items.is_empty() => 0.0,
                Ok(items) if items.len() == 1 => items[0].to_number(),
                _ => f64::NAN,
            },
            _ => f64::NAN,
        }
    }

    /// Read a member. Missing members read as `Undefined`; reading from
    /// `null`/`undefined` is a `TypeError`.
    pub fn get(&self, key: &str) -> BridgeResult<Value> {
        match self {
            Value::Undefined | Value::Null => Err(BridgeError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                self, key
            ))),
            Value::Object(object) => object.get(key),
            Value::Function(function) => match key {
                "name" => Ok(Value::string(function.name().unwrap_or(""))),
                _ => function.statics().get(key),
            },
            Value::Array(items) => {
                let items = items
                    .try_borrow()
                    .map_err(|_| BridgeError::type_error("array is being mutated"))?;
                if key == "length" {
                    return Ok(Value::Number(items.len() as f64));
                }
                Ok(key
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or(Value::Undefined))
            }
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.encode_utf16().count() as f64));
                }
                Ok(key
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| s.chars().nth(index))
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or(Value::Undefined))
            }
            _ => Ok(Value::Undefined),
        }
    }

    /// Write a member. Writes to primitives are ignored, as the host does.
    pub fn set(&self, key: &str, value: Value) -> BridgeResult<()> {
        match self {
            Value::Undefined | Value::Null => Err(BridgeError::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                self, key
            ))),
            Value::Object(object) => object.set(key, value),
            Value::Function(function) => function.statics().set(key, value),
            Value::Array(items) => {
                let index = key.parse::<usize>().map_err(|_| {
                    BridgeError::type_error(format!("cannot set '{}' on an array", key))
                })?;
                let mut items = items
                    .try_borrow_mut()
                    .map_err(|_| BridgeError::type_error("array is being read"))?;
                let length = index
                    .checked_add(1)
                    .filter(|length| *length <= MAX_ARRAY_LENGTH)
                    .ok_or_else(invalid_array_length)?;
                if length > items.len() {
                    items.resize(length, Value::Undefined);
                }
                items[index] = value;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Own enumerable keys, in insertion order.
    pub fn keys(&self) -> Vec<Rc<str>> {
        match self {
            Value::Object(object) => object.keys(),
            Value::Array(items) => items
                .try_borrow()
                .map(|items| (0..items.len()).map(|i| Rc::from(i.to_string())).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Settlement state when this value is a pending-computation object.
    pub fn promise_state(&self) -> Option<PromiseState> {
        self.as_object().and_then(|object| object.promise_state())
    }
}

pub(crate) fn invalid_array_length() -> BridgeError {
    BridgeError::thrown("RangeError", "Invalid array length")
}

/// String to number the way the host converts it: surrounding whitespace
/// ignored, empty text is zero, anything unparsable is NaN.
fn parse_numeric(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    if trimmed.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Strict equality: primitives by value (NaN is unequal to itself),
/// reference types by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (a, b) if a.is_reference() && b.is_reference() => a.identity() == b.identity(),
            _ => false,
        }
    }
}

impl Value {
    fn is_reference(&self) -> bool {
        self.identity().is_some()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}
