//! User-defined global functions and code preludes.
//!
//! Global functions are stored as source text and injected as `const`
//! bindings in front of every piece of executed code, followed by the
//! bindings for the block's own arguments.

use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as Json;
use tracing::warn;

use crate::error::{BridgeError, BridgeResult};
use crate::serializer;
use crate::value::{format_number, Property, Value};

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex should compile"));

static FUNCTION_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^function\s*\([^)]*\)\s*\{[\s\S]*\}$").expect("function regex should compile")
});

static LAMBDA_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\([^)]*\)\s*=>\s*(\{[\s\S]*\}|[^{}][^\n]*)$").expect("lambda regex should compile")
});

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` can be declared as a function.
pub fn is_legal_func_name(name: &str) -> bool {
    IDENT.is_match(name) && !RESERVED.contains(&name)
}

/// Named global functions, kept in definition order.
#[derive(Debug, Default, Clone)]
pub struct GlobalFunctions {
    defs: Vec<(String, String)>,
}

impl GlobalFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine a global function. The code must be an
    /// anonymous `function (...) {...}` or an arrow function.
    pub fn define(&mut self, name: &str, code: &str) -> BridgeResult<()> {
        if !is_legal_func_name(name) {
            return Err(BridgeError::IllegalName(name.to_string()));
        }
        let code = code.trim();
        if !FUNCTION_FORM.is_match(code) && !LAMBDA_FORM.is_match(code) {
            return Err(BridgeError::InvalidGlobalCode);
        }
        match self.defs.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = code.to_string(),
            None => self.defs.push((name.to_string(), code.to_string())),
        }
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.defs.len();
        self.defs.retain(|(n, _)| n != name);
        self.defs.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.defs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, code)| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// `const` lines for every global function, then for every bind.
    /// Binds with names that are not identifiers are skipped.
    pub fn prelude(&self, binds: &[(Rc<str>, Value)]) -> String {
        let mut out = String::new();
        for (name, code) in &self.defs {
            out.push_str(&format!("const {} = {}\n", name, code));
        }
        for (name, value) in binds {
            if !is_legal_func_name(name) {
                warn!(name = &**name, "skipping bind with illegal name");
                continue;
            }
            out.push_str(&format!("const {} = {};\n", name, literal(value)));
        }
        out
    }
}

/// Source literal for a bound argument.
fn literal(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::BigInt(n) => format!("{}n", n),
        Value::String(s) => Json::String(s.to_string()).to_string(),
        Value::Function(function) => function.source().to_string(),
        other => serializer::to_json(other)
            .ok()
            .flatten()
            .map(|json| json.to_string())
            .unwrap_or_else(|| "undefined".to_string()),
    }
}

/// Block arguments: a plain object, or JSON text describing one. Anything
/// else degrades to no arguments.
pub fn parse_arguments(args: &Value) -> Vec<(Rc<str>, Value)> {
    let object = match args {
        Value::Object(object) if object.class_name() == "Object" => Value::Object(object.clone()),
        other => match serializer::deserialize(&other.to_host_string()) {
            Ok(parsed @ Value::Object(_)) => parsed,
            Ok(_) => {
                warn!("block arguments are not an object");
                return Vec::new();
            }
            Err(err) => {
                warn!(%err, "failed to parse block arguments");
                return Vec::new();
            }
        },
    };
    let Some(object) = object.as_object() else {
        return Vec::new();
    };
    match object.properties() {
        Ok(props) => props
            .into_iter()
            .filter_map(|(key, property)| match property {
                Property::Data(value) => Some((key, value)),
                Property::Accessor(getter) => getter().ok().map(|value| (key, value)),
            })
            .collect(),
        Err(err) => {
            warn!(%err, "failed to read block arguments");
            Vec::new()
        }
    }
}
