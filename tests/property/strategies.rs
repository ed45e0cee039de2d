//! Proptest strategies for generating arbitrary host values.

#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::Value as Json;
use tether::value::{HostFunction, HostObject, ObjectKind, PromiseState};
use tether::Value;

/// Strategy for JSON documents the host can represent exactly.
///
/// Numbers are integers in the safe range or finite floats; object keys
/// are unique by construction of the map.
pub fn arb_json() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        (-1_000_000i64..1_000_000).prop_map(Json::from),
        prop::num::f64::NORMAL.prop_map(Json::from),
        "[a-zA-Z0-9 _é]{0,12}".prop_map(Json::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                .prop_map(|pairs| Json::Object(pairs.into_iter().collect())),
        ]
    })
}

/// Strategy for arbitrary values, including the awkward ones: hostile
/// getters, cycles, functions and problematic object kinds.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => arb_json().prop_map(|json| tether::serializer::from_json(&json)),
        1 => Just(Value::Undefined),
        1 => any::<i64>().prop_map(Value::bigint),
        1 => prop::num::f64::ANY.prop_map(Value::Number),
        1 => "[a-z]{0,8}".prop_map(|name| {
            Value::function(HostFunction::script(format!("function {}() {{}}", name)))
        }),
        1 => Just(Value::object(HostObject::promise(PromiseState::Pending))),
        1 => Just(Value::object(HostObject::new(ObjectKind::Map, "Map"))),
        1 => Just(hostile()),
        1 => Just(cyclic()),
    ]
}

pub fn hostile() -> Value {
    Value::object(
        HostObject::plain()
            .with_getter("constructor", || Err(tether::BridgeError::thrown("Error", "trap")))
            .with_getter("x", || Err(tether::BridgeError::thrown("Error", "trap"))),
    )
}

pub fn cyclic() -> Value {
    let items = Value::array(vec![Value::Null]);
    let holder = Value::plain_object([("items", items.clone())]);
    // Rc cycle, never freed.
    let _ = items.set("1", holder.clone());
    holder
}
