//! The bridge service object.
//!
//! One `Bridge` per runtime instance owns everything the core needs: the
//! realm of built-in singletons, the lookup registry, the component
//! registry, the execution collaborator and the user's global functions.
//! Codec operations live in [`codec`](crate::codec), block operations in
//! [`blocks`](crate::blocks).

use tracing::{debug, warn};

use crate::component::ComponentRegistry;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::exec::{ExecMode, Executor, NullExecutor};
use crate::globals::GlobalFunctions;
use crate::realm::Realm;
use crate::registry::LookupRegistry;
use crate::value::{FunctionBody, Value};
use crate::wrapper::Wrapper;

pub struct Bridge {
    config: BridgeConfig,
    realm: Realm,
    registry: LookupRegistry,
    components: ComponentRegistry,
    executor: Box<dyn Executor>,
    globals: GlobalFunctions,
    mode: ExecMode,
}

impl Bridge {
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        let realm = Realm::new();
        let mut registry = LookupRegistry::new(&config);
        if config.seed_builtins {
            registry.seed_builtins(&realm);
        }
        let mode = ExecMode::from_sandboxed(config.sandboxed);
        debug!(?mode, "bridge created");
        Bridge {
            config,
            realm,
            registry,
            components: ComponentRegistry::with_companions(),
            executor: Box::new(NullExecutor),
            globals: GlobalFunctions::new(),
            mode,
        }
    }

    /// Install the execution collaborator.
    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn registry(&self) -> &LookupRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LookupRegistry {
        &mut self.registry
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn globals(&self) -> &GlobalFunctions {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut GlobalFunctions {
        &mut self.globals
    }

    pub fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: ExecMode) {
        self.mode = mode;
    }

    pub fn to_type(&self, raw: Value) -> Wrapper {
        Wrapper::to_type(raw)
    }

    /// Call `callee` with `this` and `args`.
    ///
    /// Script functions and restored functions run through the executor.
    /// A restored function that fails to run (typically because the
    /// bindings it closed over are gone) yields its source text instead.
    pub fn call(&self, callee: &Value, this: &Value, args: &[Value]) -> BridgeResult<Value> {
        let Value::Function(function) = callee else {
            return Err(BridgeError::NotCallable(
                Wrapper::to_type(callee.clone()).to_display_string(),
            ));
        };
        match function.body() {
            FunctionBody::Native { call: Some(call), .. } => call(this, args),
            FunctionBody::Native { call: None, .. } => Err(BridgeError::type_error(format!(
                "Class constructor {} cannot be invoked without 'new'",
                function.name().unwrap_or("anonymous")
            ))),
            FunctionBody::Script => self.executor.call(function.source(), this, args),
            FunctionBody::Restored => match self.executor.call(function.source(), this, args) {
                Ok(result) => Ok(result),
                Err(err) => {
                    warn!(%err, "restored function failed, returning its source");
                    Ok(Value::string(function.source()))
                }
            },
        }
    }

    /// `new callee(...args)`.
    pub fn construct(&self, callee: &Value, args: &[Value]) -> BridgeResult<Value> {
        let Value::Function(function) = callee else {
            return Err(BridgeError::NotConstructor(
                Wrapper::to_type(callee.clone()).to_display_string(),
            ));
        };
        match function.body() {
            FunctionBody::Native {
                construct: Some(construct),
                ..
            } => construct(callee, args),
            FunctionBody::Native { construct: None, .. } => Err(BridgeError::NotConstructor(
                function.name().unwrap_or("anonymous").to_string(),
            )),
            FunctionBody::Script | FunctionBody::Restored => {
                self.executor.construct(function.source(), args)
            }
        }
    }

    /// Turn a restored function into a live one by evaluating its source.
    /// Anything else is returned unchanged.
    pub fn materialize(&self, value: &Value) -> BridgeResult<Value> {
        match value {
            Value::Function(function) if function.is_restored() => {
                let live = self
                    .executor
                    .evaluate(&format!("return ({});", function.source()), self.mode)?;
                if live.is_callable() {
                    Ok(live)
                } else {
                    Err(BridgeError::Execution(format!(
                        "source did not evaluate to a function: {}",
                        function.source()
                    )))
                }
            }
            other => Ok(other.clone()),
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
