//! Display and Debug implementations for values
//!
//! `Display` is the host's own string conversion (what string
//! concatenation would produce), used for fallback payloads and method
//! results. The bounded labels shown in the block layer live on the
//! wrapper instead.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::value::{FunctionBody, Property, Value};

/// Render a number the way the host prints it: integral values without a
/// fractional part, `NaN`/`Infinity` spelled out, exponents signed.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", n);
    }
    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => text,
    }
}

impl Value {
    /// Host string conversion. Cycles through arrays render as empty text.
    pub fn to_host_string(&self) -> String {
        let mut seen = FxHashSet::default();
        host_string(self, &mut seen)
    }
}

fn host_string(value: &Value, seen: &mut FxHashSet<usize>) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::BigInt(n) => n.to_string(),
        Value::String(s) => s.to_string(),
        Value::Array(items) => {
            let id = value.identity().unwrap_or_default();
            if !seen.insert(id) {
                return String::new();
            }
            let Ok(items) = items.try_borrow() else {
                return String::new();
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        host_string(item, seen)
                    }
                })
                .collect();
            seen.remove(&id);
            parts.join(",")
        }
        Value::Object(object) => {
            if object.is_error() {
                let field = |key: &str| match object.get_own(key) {
                    Some(Property::Data(v)) => v.to_host_string(),
                    _ => String::new(),
                };
                let (name, message) = (field("name"), field("message"));
                if message.is_empty() {
                    name
                } else {
                    format!("{}: {}", name, message)
                }
            } else {
                "[object Object]".to_string()
            }
        }
        Value::Function(function) => function.source().to_string(),
        Value::Foreign(foreign) => foreign
            .display()
            .unwrap_or_else(|_| format!("[object {}]", foreign.type_tag())),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_host_string())
    }
}

const DEBUG_DEPTH: usize = 4;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_debug(self, f, DEBUG_DEPTH)
    }
}

fn fmt_debug(value: &Value, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => write!(f, "{}", format_number(*n)),
        Value::BigInt(n) => write!(f, "{}n", n),
        Value::String(s) => write!(f, "{:?}", s),
        Value::Array(items) => {
            if depth == 0 {
                return write!(f, "[..]");
            }
            let Ok(items) = items.try_borrow() else {
                return write!(f, "[<borrowed>]");
            };
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_debug(item, f, depth - 1)?;
            }
            write!(f, "]")
        }
        Value::Object(object) => {
            write!(f, "{} {{", object.class_name())?;
            if depth == 0 {
                return write!(f, " .. }}");
            }
            let Ok(props) = object.properties() else {
                return write!(f, " <borrowed> }}");
            };
            for (i, (key, prop)) in props.iter().enumerate() {
                write!(f, "{}{}: ", if i > 0 { ", " } else { " " }, key)?;
                match prop {
                    Property::Data(v) => fmt_debug(v, f, depth - 1)?,
                    Property::Accessor(_) => write!(f, "<getter>")?,
                }
            }
            write!(f, " }}")
        }
        Value::Function(function) => {
            let kind = match function.body() {
                FunctionBody::Native { .. } => "native",
                FunctionBody::Script => "script",
                FunctionBody::Restored => "restored",
            };
            write!(
                f,
                "<{} function {}>",
                kind,
                function.name().unwrap_or("anonymous")
            )
        }
        Value::Foreign(foreign) => write!(f, "<{}>", foreign.type_tag()),
    }
}
