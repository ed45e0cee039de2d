//! Shared test helpers for the tether test suite.
//!
//! The bridge never runs code itself, so tests that exercise evaluation
//! install a [`ScriptedExecutor`]: a table from code text to the Rust
//! closure standing in for it.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tether::{Bridge, BridgeError, BridgeResult, ExecMode, Executor, Value};

type Script = Rc<dyn Fn(&Value, &[Value]) -> BridgeResult<Value>>;

/// Executor driven by a fixed table of scripts.
///
/// `evaluate` matches when the evaluated text ends with a script's key
/// (so a prelude in front does not matter); `call` and `construct`
/// match the function source exactly.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    scripts: Vec<(String, Script)>,
    log: Rc<RefCell<Vec<(String, ExecMode)>>>,
    unsandbox: bool,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        key: &str,
        script: impl Fn(&Value, &[Value]) -> BridgeResult<Value> + 'static,
    ) -> Self {
        self.scripts.push((key.to_string(), Rc::new(script)));
        self
    }

    pub fn allow_unsandbox(mut self) -> Self {
        self.unsandbox = true;
        self
    }

    /// Every evaluated text with the mode it ran in, shared with clones.
    pub fn log(&self) -> Rc<RefCell<Vec<(String, ExecMode)>>> {
        self.log.clone()
    }

    fn find(&self, matches: impl Fn(&str) -> bool) -> Option<Script> {
        self.scripts
            .iter()
            .find(|(key, _)| matches(key))
            .map(|(_, script)| script.clone())
    }
}

impl Executor for ScriptedExecutor {
    fn evaluate(&self, code: &str, mode: ExecMode) -> BridgeResult<Value> {
        self.log.borrow_mut().push((code.to_string(), mode));
        match self.find(|key| code.ends_with(key)) {
            Some(script) => script(&Value::Undefined, &[]),
            None => Err(BridgeError::Execution(format!("unknown code: {}", code))),
        }
    }

    fn call(&self, source: &str, this: &Value, args: &[Value]) -> BridgeResult<Value> {
        match self.find(|key| key == source) {
            Some(script) => script(this, args),
            None => Err(BridgeError::thrown(
                "ReferenceError",
                format!("free variable in {}", source),
            )),
        }
    }

    fn construct(&self, source: &str, args: &[Value]) -> BridgeResult<Value> {
        match self.find(|key| key == source) {
            Some(script) => script(&Value::Undefined, args),
            None => Err(BridgeError::NotConstructor(source.to_string())),
        }
    }

    fn can_unsandbox(&self) -> bool {
        self.unsandbox
    }
}

/// A bridge with default configuration and the given executor.
pub fn setup(executor: ScriptedExecutor) -> Bridge {
    Bridge::new().with_executor(executor)
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn args(items: &[Value]) -> Value {
    Value::array(items.to_vec())
}
