//! Callable host values.
//!
//! Every function carries its source text, since source is the only
//! thing about a callable that survives persistence. Closures do not.

use std::rc::Rc;

use super::object::{HostObject, ObjectKind};
use super::Value;
use crate::error::BridgeResult;

pub type FunctionRef = Rc<HostFunction>;

/// Host-implemented function: receives `this` and the call arguments.
pub type NativeFn = fn(&Value, &[Value]) -> BridgeResult<Value>;

#[derive(Clone, Copy)]
pub enum FunctionBody {
    /// Implemented by the host. A missing `call` means the function can
    /// only be used with `new`; a missing `construct` means it cannot.
    Native {
        call: Option<NativeFn>,
        construct: Option<NativeFn>,
    },
    /// User code, run by the execution collaborator from its source.
    Script,
    /// Rebuilt from persisted source text. Nothing has been executed yet;
    /// the execution collaborator turns it into something callable on use.
    Restored,
}

impl std::fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionBody::Native { call, construct } => f
                .debug_struct("Native")
                .field("callable", &call.is_some())
                .field("constructible", &construct.is_some())
                .finish(),
            FunctionBody::Script => write!(f, "Script"),
            FunctionBody::Restored => write!(f, "Restored"),
        }
    }
}

pub struct HostFunction {
    name: Option<Rc<str>>,
    source: Rc<str>,
    body: FunctionBody,
    statics: HostObject,
}

impl HostFunction {
    pub fn native(name: &str, call: NativeFn) -> Self {
        Self::native_with(name, Some(call), None)
    }

    pub fn native_with(name: &str, call: Option<NativeFn>, construct: Option<NativeFn>) -> Self {
        HostFunction {
            name: Some(Rc::from(name)),
            source: Rc::from(format!("function {}() {{ [native code] }}", name)),
            body: FunctionBody::Native { call, construct },
            statics: HostObject::new(ObjectKind::Namespace, "Function"),
        }
    }

    pub fn script(source: impl AsRef<str>) -> Self {
        Self::from_source(source.as_ref(), FunctionBody::Script)
    }

    pub fn restored(source: impl AsRef<str>) -> Self {
        Self::from_source(source.as_ref(), FunctionBody::Restored)
    }

    fn from_source(source: &str, body: FunctionBody) -> Self {
        HostFunction {
            name: name_from_source(source),
            source: Rc::from(source),
            body,
            statics: HostObject::new(ObjectKind::Namespace, "Function"),
        }
    }

    /// Attach a static member (e.g. `Number.MAX_SAFE_INTEGER`).
    pub fn with_static(self, key: &str, value: Value) -> Self {
        self.statics.define(key, super::Property::Data(value));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn body(&self) -> FunctionBody {
        self.body
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, FunctionBody::Native { .. })
    }

    pub fn is_restored(&self) -> bool {
        matches!(self.body, FunctionBody::Restored)
    }

    pub fn statics(&self) -> &HostObject {
        &self.statics
    }
}

/// Declared name of a function or class from its source text.
///
/// Handles `function name(`, `async function name(`, `function* name(`
/// and `class Name`. Arrow functions and anonymous expressions have none.
pub fn name_from_source(source: &str) -> Option<Rc<str>> {
    let mut rest = source.trim_start();
    if let Some(after) = rest.strip_prefix("async") {
        if after.starts_with(char::is_whitespace) {
            rest = after.trim_start();
        }
    }
    let rest = if let Some(after) = rest.strip_prefix("function") {
        if after.starts_with(is_ident_char) {
            return None;
        }
        after.trim_start().trim_start_matches('*').trim_start()
    } else if let Some(after) = rest.strip_prefix("class") {
        if !after.starts_with(char::is_whitespace) {
            return None;
        }
        after.trim_start()
    } else {
        return None;
    };
    let end = rest
        .find(|c: char| !is_ident_char(c))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        None
    } else {
        Some(Rc::from(name))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
