//! Native functions of the built-in singletons.
//!
//! Each namespace exports a table of [`NativeDef`]s; `Realm::new` is the
//! single place that attaches them. Constructors receive the constructor
//! function itself as `this`, which lets one native serve several
//! constructors.

use tracing::{error, info, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::serializer;
use crate::value::{
    invalid_array_length, HostFunction, HostObject, NativeFn, ObjectKind, PromiseState, Value,
    MAX_ARRAY_LENGTH, MAX_SAFE_INTEGER,
};

pub struct NativeDef {
    pub name: &'static str,
    pub func: NativeFn,
}

const fn def(name: &'static str, func: NativeFn) -> NativeDef {
    NativeDef { name, func }
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

fn callee_name(this: &Value) -> String {
    this.as_function()
        .and_then(|function| function.name())
        .unwrap_or("anonymous")
        .to_string()
}

// Math

pub const MATH: &[NativeDef] = &[
    def("max", prim_max),
    def("min", prim_min),
    def("abs", prim_abs),
    def("floor", prim_floor),
    def("ceil", prim_ceil),
    def("round", prim_round),
    def("sqrt", prim_sqrt),
    def("pow", prim_pow),
];

pub fn prim_max(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    let mut best = f64::NEG_INFINITY;
    for n in args.iter().map(Value::to_number) {
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        best = best.max(n);
    }
    Ok(Value::Number(best))
}

pub fn prim_min(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    let mut best = f64::INFINITY;
    for n in args.iter().map(Value::to_number) {
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        best = best.min(n);
    }
    Ok(Value::Number(best))
}

pub fn prim_abs(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Number(arg(args, 0).to_number().abs()))
}

pub fn prim_floor(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Number(arg(args, 0).to_number().floor()))
}

pub fn prim_ceil(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Number(arg(args, 0).to_number().ceil()))
}

/// Rounds half up, like the host (`round(-2.5)` is `-2`).
pub fn prim_round(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Number((arg(args, 0).to_number() + 0.5).floor()))
}

pub fn prim_sqrt(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Number(arg(args, 0).to_number().sqrt()))
}

pub fn prim_pow(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Number(
        arg(args, 0).to_number().powf(arg(args, 1).to_number()),
    ))
}

// JSON

pub const JSON: &[NativeDef] = &[def("stringify", prim_stringify), def("parse", prim_parse)];

/// `JSON.stringify(value, replacer, indent)`. Replacers are ignored.
pub fn prim_stringify(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    let indent = match arg(args, 2) {
        Value::Number(n) if n.is_finite() && n > 0.0 => (n as usize).min(10),
        _ => 0,
    };
    match serializer::to_json(&arg(args, 0))? {
        Some(json) => Ok(Value::string(serializer::write_json(&json, indent)?)),
        None => Ok(Value::Undefined),
    }
}

pub fn prim_parse(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    serializer::deserialize(&arg(args, 0).to_host_string())
        .map_err(|e| BridgeError::thrown("SyntaxError", e.message()))
}

// Object / Array / Reflect

pub const OBJECT: &[NativeDef] = &[def("keys", prim_keys)];

pub const ARRAY: &[NativeDef] = &[def("isArray", prim_is_array)];

pub const REFLECT: &[NativeDef] = &[def("ownKeys", prim_keys)];

pub fn prim_keys(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    let target = arg(args, 0);
    if target.is_nullish() {
        return Err(BridgeError::type_error(
            "Cannot convert undefined or null to object",
        ));
    }
    Ok(Value::array(
        target.keys().into_iter().map(Value::String).collect(),
    ))
}

pub fn prim_is_array(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
}

/// `Object(x)`: composites pass through, anything else gets a fresh object.
pub fn prim_object(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    match arg(args, 0) {
        v @ (Value::Array(_) | Value::Object(_) | Value::Function(_)) => Ok(v),
        _ => Ok(Value::object(HostObject::plain())),
    }
}

/// `Array(...)`: a single numeric argument is a length.
pub fn prim_array(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    match args {
        [Value::Number(n)] => {
            if n.fract() != 0.0 || *n < 0.0 || *n > MAX_ARRAY_LENGTH as f64 {
                return Err(invalid_array_length());
            }
            Ok(Value::array(vec![Value::Undefined; *n as usize]))
        }
        _ => Ok(Value::array(args.to_vec())),
    }
}

// Primitive conversions

pub fn prim_string(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    match args.first() {
        Some(v) => Ok(Value::string(v.to_host_string())),
        None => Ok(Value::string("")),
    }
}

pub fn prim_number(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    match args.first() {
        Some(v) => Ok(Value::Number(v.to_number())),
        None => Ok(Value::Number(0.0)),
    }
}

pub fn prim_boolean(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Bool(arg(args, 0).to_boolean()))
}

pub const NUMBER: &[NativeDef] = &[def("isInteger", prim_is_integer)];

pub fn prim_is_integer(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::Bool(match arg(args, 0) {
        Value::Number(n) => n.is_finite() && n.fract() == 0.0,
        _ => false,
    }))
}

pub fn number_statics() -> [(&'static str, Value); 4] {
    [
        ("MAX_SAFE_INTEGER", Value::Number(MAX_SAFE_INTEGER as f64)),
        ("MIN_SAFE_INTEGER", Value::Number(-(MAX_SAFE_INTEGER as f64))),
        ("POSITIVE_INFINITY", Value::Number(f64::INFINITY)),
        ("NaN", Value::Number(f64::NAN)),
    ]
}

// Promise

pub const PROMISE: &[NativeDef] = &[
    def("resolve", prim_promise_resolve),
    def("reject", prim_promise_reject),
];

pub fn prim_promise_resolve(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    let value = arg(args, 0);
    if value.promise_state().is_some() {
        return Ok(value);
    }
    Ok(Value::object(HostObject::promise(PromiseState::Fulfilled(
        value,
    ))))
}

pub fn prim_promise_reject(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::object(HostObject::promise(PromiseState::Rejected(
        arg(args, 0),
    ))))
}

// Constructors

/// `Error(msg)` and `new Error(msg)` behave the same.
pub fn prim_error(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    let message = match arg(args, 0) {
        Value::Undefined => String::new(),
        other => other.to_host_string(),
    };
    Ok(Value::object(HostObject::error("Error", &message)))
}

/// `new Map()`, `new Set()`, `new WeakMap()`, `new WeakSet()`.
pub fn prim_new_collection(this: &Value, _args: &[Value]) -> BridgeResult<Value> {
    let name = callee_name(this);
    let kind = match name.as_str() {
        "Map" => ObjectKind::Map,
        "Set" => ObjectKind::Set,
        "WeakMap" => ObjectKind::WeakMap,
        "WeakSet" => ObjectKind::WeakSet,
        _ => return Err(BridgeError::NotConstructor(name)),
    };
    Ok(Value::object(HostObject::new(kind, &name)))
}

/// `Function(a, b, body)`: builds a script function from text. Nothing is
/// executed until the function is called.
pub fn prim_function(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::function(HostFunction::script(dynamic_source(
        "function", args,
    ))))
}

pub fn prim_async_function(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    Ok(Value::function(HostFunction::script(dynamic_source(
        "async function",
        args,
    ))))
}

fn dynamic_source(keyword: &str, args: &[Value]) -> String {
    let (body, params) = match args.split_last() {
        Some((body, params)) => (body.to_host_string(), params),
        None => (String::new(), args),
    };
    let params: Vec<String> = params.iter().map(Value::to_host_string).collect();
    format!("{} anonymous({}\n) {{\n{}\n}}", keyword, params.join(","), body)
}

/// Constructors whose behaviour depends on the host (clocks, regex
/// engines, proxies, symbols).
pub fn prim_unsupported(this: &Value, _args: &[Value]) -> BridgeResult<Value> {
    Err(BridgeError::NotSupported(format!("new {}", callee_name(this))))
}

// console

pub const CONSOLE: &[NativeDef] = &[
    def("log", prim_log),
    def("info", prim_log),
    def("warn", prim_warn),
    def("error", prim_error_log),
];

fn console_line(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_host_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn prim_log(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    info!(target: "tether::console", "{}", console_line(args));
    Ok(Value::Undefined)
}

pub fn prim_warn(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    warn!(target: "tether::console", "{}", console_line(args));
    Ok(Value::Undefined)
}

pub fn prim_error_log(_this: &Value, args: &[Value]) -> BridgeResult<Value> {
    error!(target: "tether::console", "{}", console_line(args));
    Ok(Value::Undefined)
}
