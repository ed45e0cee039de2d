//! Typed error system for the bridge
//!
//! Internal fallible paths return `BridgeResult` and propagate with `?`.
//! The surfaces the block layer sees (display, persistence, block
//! operations) absorb these errors instead of passing them on: they turn
//! into placeholder strings, `null` slots, or wrapped error values.

use thiserror::Error;

/// Errors raised while inspecting, converting, or persisting host values.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// An exception raised by host code (a getter, a native function,
    /// executed user code). `name` is the host error class, e.g. `TypeError`.
    #[error("{name}: {message}")]
    Thrown { name: String, message: String },

    /// Member lookup found nothing on the target.
    #[error("TypeError: {target} has no member '{member}'")]
    NoSuchMember { target: String, member: String },

    #[error("TypeError: {0} is not a function")]
    NotCallable(String),

    #[error("TypeError: {0} is not a constructor")]
    NotConstructor(String),

    /// The operation has no host-independent meaning in this runtime.
    #[error("{0} is not supported by this host")]
    NotSupported(String),

    /// The value graph could not be rendered as text.
    #[error("value could not be serialized: {0}")]
    Serialize(String),

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no component registered for type tag '{0}'")]
    UnknownComponent(String),

    #[error("component '{tag}' failed: {message}")]
    Component { tag: String, message: String },

    /// The execution collaborator rejected or failed to run code.
    #[error("execution failed: {0}")]
    Execution(String),

    #[error("code execution is not available")]
    ExecutionUnavailable,

    #[error("illegal function name '{0}'")]
    IllegalName(String),

    #[error("global code must be a 'function' or a lambda")]
    InvalidGlobalCode,

    #[error("malformed payload: {0}")]
    BadPayload(String),
}

impl BridgeError {
    /// A host exception with an explicit class name.
    pub fn thrown(name: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Thrown {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::thrown("TypeError", message)
    }

    pub fn component(tag: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Component {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Host error class this error presents as when wrapped for the block layer.
    pub fn name(&self) -> &str {
        match self {
            BridgeError::Thrown { name, .. } => name,
            BridgeError::NoSuchMember { .. }
            | BridgeError::NotCallable(_)
            | BridgeError::NotConstructor(_) => "TypeError",
            BridgeError::Parse(_) => "SyntaxError",
            _ => "Error",
        }
    }

    /// Message without the class-name prefix.
    pub fn message(&self) -> String {
        match self {
            BridgeError::Thrown { message, .. } => message.clone(),
            BridgeError::NoSuchMember { target, member } => {
                format!("{} has no member '{}'", target, member)
            }
            BridgeError::NotCallable(what) => format!("{} is not a function", what),
            BridgeError::NotConstructor(what) => format!("{} is not a constructor", what),
            other => other.to_string(),
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
