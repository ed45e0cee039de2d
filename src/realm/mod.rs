//! Built-in singletons of one runtime instance.
//!
//! A `Realm` is built once per bridge. Its singletons are identity
//! significant: the registry seeds a stable token for each, and every
//! later occurrence of the same object resolves to that token.

pub mod natives;

use std::rc::Rc;

use crate::value::{HostFunction, HostObject, NativeFn, ObjectKind, Property, Value};
use natives::NativeDef;

/// Names of the recognized singletons, in seeding order.
pub const SINGLETON_NAMES: &[&str] = &[
    "Math",
    "JSON",
    "Object",
    "Array",
    "String",
    "Number",
    "Boolean",
    "Function",
    "AsyncFunction",
    "Date",
    "RegExp",
    "Promise",
    "Error",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Symbol",
    "Proxy",
    "Reflect",
    "Intl",
    "console",
    "globalThis",
];

pub struct Realm {
    singletons: Vec<(&'static str, Value)>,
    global: Value,
}

fn namespace(name: &str, table: &[NativeDef]) -> HostObject {
    let object = HostObject::new(ObjectKind::Namespace, name);
    for native in table {
        object.define(
            native.name,
            Property::Data(Value::function(HostFunction::native(native.name, native.func))),
        );
    }
    object
}

fn constructor(
    name: &str,
    call: Option<NativeFn>,
    construct: Option<NativeFn>,
    table: &[NativeDef],
) -> HostFunction {
    let mut function = HostFunction::native_with(name, call, construct);
    for native in table {
        function = function.with_static(
            native.name,
            Value::function(HostFunction::native(native.name, native.func)),
        );
    }
    function
}

impl Realm {
    pub fn new() -> Self {
        use natives::*;

        let math = namespace("Math", MATH)
            .with_property("PI", Value::Number(std::f64::consts::PI))
            .with_property("E", Value::Number(std::f64::consts::E));

        let mut number = constructor(
            "Number",
            Some(prim_number),
            Some(prim_unsupported),
            NUMBER,
        );
        for (key, value) in number_statics() {
            number = number.with_static(key, value);
        }

        let mut singletons: Vec<(&'static str, Value)> = vec![
            ("Math", Value::object(math)),
            ("JSON", Value::object(namespace("JSON", JSON))),
            (
                "Object",
                Value::function(constructor("Object", Some(prim_object), Some(prim_object), OBJECT)),
            ),
            (
                "Array",
                Value::function(constructor("Array", Some(prim_array), Some(prim_array), ARRAY)),
            ),
            (
                "String",
                Value::function(constructor("String", Some(prim_string), Some(prim_unsupported), &[])),
            ),
            ("Number", Value::function(number)),
            (
                "Boolean",
                Value::function(constructor("Boolean", Some(prim_boolean), Some(prim_unsupported), &[])),
            ),
            (
                "Function",
                Value::function(constructor("Function", Some(prim_function), Some(prim_function), &[])),
            ),
            (
                "AsyncFunction",
                Value::function(constructor(
                    "AsyncFunction",
                    Some(prim_async_function),
                    Some(prim_async_function),
                    &[],
                )),
            ),
            (
                "Date",
                Value::function(constructor("Date", None, Some(prim_unsupported), &[])),
            ),
            (
                "RegExp",
                Value::function(constructor("RegExp", None, Some(prim_unsupported), &[])),
            ),
            (
                "Promise",
                Value::function(constructor("Promise", None, Some(prim_unsupported), PROMISE)),
            ),
            (
                "Error",
                Value::function(constructor("Error", Some(prim_error), Some(prim_error), &[])),
            ),
            (
                "Map",
                Value::function(constructor("Map", None, Some(prim_new_collection), &[])),
            ),
            (
                "Set",
                Value::function(constructor("Set", None, Some(prim_new_collection), &[])),
            ),
            (
                "WeakMap",
                Value::function(constructor("WeakMap", None, Some(prim_new_collection), &[])),
            ),
            (
                "WeakSet",
                Value::function(constructor("WeakSet", None, Some(prim_new_collection), &[])),
            ),
            (
                "Symbol",
                Value::function(constructor("Symbol", None, None, &[])),
            ),
            (
                "Proxy",
                Value::function(constructor("Proxy", None, Some(prim_unsupported), &[])),
            ),
            ("Reflect", Value::object(namespace("Reflect", REFLECT))),
            ("Intl", Value::object(namespace("Intl", &[]))),
            ("console", Value::object(namespace("console", CONSOLE))),
        ];

        let scope = Rc::new(HostObject::new(ObjectKind::Namespace, "Window"));
        for (name, value) in &singletons {
            scope.define(name, Property::Data(value.clone()));
        }
        scope.define("Infinity", Property::Data(Value::Number(f64::INFINITY)));
        scope.define("NaN", Property::Data(Value::Number(f64::NAN)));
        scope.define("undefined", Property::Data(Value::Undefined));
        let global = Value::Object(scope.clone());
        scope.define("globalThis", Property::Data(global.clone()));
        singletons.push(("globalThis", global.clone()));

        Realm { singletons, global }
    }

    /// Look up a singleton by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.singletons
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn singletons(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.singletons.iter().map(|(name, value)| (*name, value))
    }

    pub fn global(&self) -> &Value {
        &self.global
    }

    /// Name of the singleton `value` is, if it is one.
    pub fn singleton_name(&self, value: &Value) -> Option<&'static str> {
        let id = value.identity()?;
        self.singletons
            .iter()
            .find(|(_, v)| v.identity() == Some(id))
            .map(|(name, _)| *name)
    }
}

// `globalThis` holds itself; break the cycle so the realm is freed.
impl Drop for Realm {
    fn drop(&mut self) {
        if let Value::Object(global) = &self.global {
            global.remove("globalThis");
        }
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain constants that read like globals but are not singletons.
pub fn constant(name: &str) -> Option<Value> {
    match name {
        "Infinity" => Some(Value::Number(f64::INFINITY)),
        "NaN" => Some(Value::Number(f64::NAN)),
        "null" => Some(Value::Null),
        "undefined" => Some(Value::Undefined),
        _ => None,
    }
}
