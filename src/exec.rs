//! Execution collaborator
//!
//! The bridge never runs code text itself. Anything that needs user code
//! executed (evaluation blocks, calling script or restored functions,
//! turning restored source back into a live function) goes through an
//! [`Executor`] supplied by the embedder.

use crate::error::{BridgeError, BridgeResult};
use crate::value::Value;

/// Whether user code runs inside the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Sandboxed,
    Unsandboxed,
}

impl ExecMode {
    pub fn from_sandboxed(sandboxed: bool) -> Self {
        if sandboxed {
            ExecMode::Sandboxed
        } else {
            ExecMode::Unsandboxed
        }
    }

    pub fn is_sandboxed(self) -> bool {
        self == ExecMode::Sandboxed
    }
}

/// Dynamic execution facility of the host.
pub trait Executor {
    /// Run a code body (already prefixed with any prelude) and return
    /// its completion value.
    fn evaluate(&self, code: &str, mode: ExecMode) -> BridgeResult<Value>;

    /// Call the function whose source text is `source`.
    fn call(&self, source: &str, this: &Value, args: &[Value]) -> BridgeResult<Value>;

    /// Construct with the function or class whose source text is `source`.
    fn construct(&self, source: &str, args: &[Value]) -> BridgeResult<Value> {
        let _ = args;
        Err(BridgeError::NotConstructor(source.to_string()))
    }

    /// Whether the host allows leaving the sandbox.
    fn can_unsandbox(&self) -> bool {
        false
    }
}

/// Executor for hosts without dynamic execution: refuses everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExecutor;

impl Executor for NullExecutor {
    fn evaluate(&self, _code: &str, _mode: ExecMode) -> BridgeResult<Value> {
        Err(BridgeError::ExecutionUnavailable)
    }

    fn call(&self, _source: &str, _this: &Value, _args: &[Value]) -> BridgeResult<Value> {
        Err(BridgeError::ExecutionUnavailable)
    }
}
