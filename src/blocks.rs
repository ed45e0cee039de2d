//! Block operations.
//!
//! Every operation here is what one visual block does. None of them fail
//! across the block boundary: errors come back as wrapped error values
//! (reporters) or are logged (commands that report nothing useful).

use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::bridge::Bridge;
use crate::codec::Exported;
use crate::companion::{ListValue, RecordValue};
use crate::error::{BridgeError, BridgeResult};
use crate::exec::ExecMode;
use crate::globals::parse_arguments;
use crate::realm;
use crate::serializer;
use crate::value::{HostObject, PromiseState, Property, Value};
use crate::wrapper::Wrapper;

/// Call arguments; most calls take only a few.
pub type Args = SmallVec<[Value; 4]>;

fn reported(result: BridgeResult<Value>) -> Wrapper {
    match result {
        Ok(value) => Wrapper::to_type(value),
        Err(err) => Wrapper::from_error(&err),
    }
}

fn commanded(what: &str, result: BridgeResult<Value>) -> Wrapper {
    match result {
        Ok(_) => Wrapper::undefined(),
        Err(err) => {
            warn!(%err, block = what, "block failed");
            Wrapper::from_error(&err)
        }
    }
}

impl Bridge {
    /// Flatten a block argument into call arguments: lists and arrays
    /// spread, nothing gives no arguments, anything else is one argument.
    pub fn args_list(&self, args: &Value) -> Args {
        if let Some(list) = args.downcast_foreign::<ListValue>() {
            return list.items.iter().cloned().collect();
        }
        match self.normalize(args).into_inner() {
            Value::Undefined | Value::Null => Args::new(),
            Value::Array(items) => items
                .try_borrow()
                .map(|items| items.iter().cloned().collect())
                .unwrap_or_default(),
            other => smallvec::smallvec![other],
        }
    }

    fn run_code(&self, code: &str, binds: &[(Rc<str>, Value)]) -> BridgeResult<Value> {
        let mut source = self.globals().prelude(binds);
        source.push_str(code);
        self.executor().evaluate(&source, self.mode())
    }

    /// Evaluate code and report its completion value.
    pub fn eval_js(&self, code: &str) -> Wrapper {
        reported(self.run_code(code, &[]))
    }

    /// Evaluate code with `args` bound as constants.
    pub fn eval_js_with(&self, code: &str, args: &Value) -> Wrapper {
        let binds = parse_arguments(self.normalize(args).inner());
        reported(self.run_code(code, &binds))
    }

    pub fn run_js(&self, code: &str, args: Option<&Value>) -> Wrapper {
        let binds = args
            .map(|args| parse_arguments(self.normalize(args).inner()))
            .unwrap_or_default();
        commanded("run_js", self.run_code(code, &binds))
    }

    /// Evaluate code as a condition. A settled promise counts as its
    /// value; failures count as false.
    pub fn js_boolean(&self, code: &str, args: Option<&Value>) -> bool {
        let binds = args
            .map(|args| parse_arguments(self.normalize(args).inner()))
            .unwrap_or_default();
        match self.run_code(code, &binds) {
            Ok(value) => match value.promise_state() {
                Some(PromiseState::Fulfilled(settled)) => settled.to_boolean(),
                Some(PromiseState::Rejected(_)) => false,
                _ => value.to_boolean(),
            },
            Err(err) => {
                warn!(%err, "boolean block failed");
                false
            }
        }
    }

    /// `new ctor(...args)`.
    pub fn new_instance(&self, ctor: &Value, args: &Value) -> Wrapper {
        let ctor = self.normalize(ctor);
        let args = self.args_list(args);
        reported(self.construct(ctor.inner(), &args))
    }

    fn invoke_method(&self, instance: &Value, method: &str, args: &Value) -> BridgeResult<Value> {
        let target = self.normalize(instance).into_inner();
        let args = self.args_list(args);
        let member = target.get(method)?;
        if member.is_callable() {
            return self.call(&member, &target, &args);
        }
        if !matches!(member, Value::Undefined) {
            return Err(BridgeError::NotCallable(format!(
                "{}.{}",
                Wrapper::to_type(target.clone()).to_display_string(),
                method
            )));
        }
        intrinsic(&target, method, &args).unwrap_or_else(|| {
            Err(BridgeError::NoSuchMember {
                target: Wrapper::to_type(target.clone()).to_display_string(),
                member: method.to_string(),
            })
        })
    }

    pub fn call_method(&self, instance: &Value, method: &str, args: &Value) -> Wrapper {
        reported(self.invoke_method(instance, method, args))
    }

    /// Like [`call_method`](Self::call_method), but a settled promise
    /// reports its outcome. A pending one is reported as is; the caller
    /// waits for it.
    pub fn await_call_method(&self, instance: &Value, method: &str, args: &Value) -> Wrapper {
        let result = match self.invoke_method(instance, method, args) {
            Ok(result) => result,
            Err(err) => return Wrapper::from_error(&err),
        };
        match result.promise_state() {
            Some(PromiseState::Fulfilled(value)) => Wrapper::to_type(value),
            Some(PromiseState::Rejected(reason)) => {
                let is_error = reason
                    .as_object()
                    .map(|object| object.is_error())
                    .unwrap_or(false);
                if is_error {
                    Wrapper::to_type(reason)
                } else {
                    Wrapper::from_error(&BridgeError::thrown("Error", reason.to_host_string()))
                }
            }
            _ => Wrapper::to_type(result),
        }
    }

    pub fn run_method(&self, instance: &Value, method: &str, args: &Value) -> Wrapper {
        commanded("run_method", self.invoke_method(instance, method, args))
    }

    pub fn get_prop(&self, instance: &Value, prop: &str) -> Wrapper {
        let target = self.normalize(instance).into_inner();
        reported(target.get(prop))
    }

    fn assign(&self, what: &str, instance: &Value, prop: &str, value: Value) -> Wrapper {
        let target = self.normalize(instance).into_inner();
        commanded(what, target.set(prop, value).map(|_| Value::Undefined))
    }

    /// Set a property to a text or number argument.
    pub fn set_prop_string(&self, instance: &Value, prop: &str, value: &Value) -> Wrapper {
        let value = match value {
            Value::Number(_) | Value::String(_) => value.clone(),
            other => Value::string(other.to_host_string()),
        };
        self.assign("set_prop_string", instance, prop, value)
    }

    pub fn set_prop_wrapper(&self, instance: &Value, prop: &str, value: &Value) -> Wrapper {
        let value = self.normalize(value).into_inner();
        self.assign("set_prop_wrapper", instance, prop, value)
    }

    /// Set a property to a list argument, converted to a host array.
    pub fn set_prop_list(&self, instance: &Value, prop: &str, list: &Value) -> Wrapper {
        let value = match list.downcast_foreign::<ListValue>() {
            Some(list) => Value::array(list.items.clone()),
            None => Value::array(self.args_list(list).into_vec()),
        };
        self.assign("set_prop_list", instance, prop, value)
    }

    /// Set a property to a record argument, converted to a plain object.
    pub fn set_prop_record(&self, instance: &Value, prop: &str, record: &Value) -> Wrapper {
        let value = match record.downcast_foreign::<RecordValue>() {
            Some(record) => {
                let object = HostObject::plain();
                for (key, member) in &record.entries {
                    object.define(key, Property::Data(member.clone()));
                }
                Value::object(object)
            }
            None => self.normalize(record).into_inner(),
        };
        self.assign("set_prop_record", instance, prop, value)
    }

    /// Indented text of any value; wrappers stringify their inner value.
    pub fn stringify(&self, value: &Value) -> String {
        let inner = self.normalize(value).into_inner();
        serializer::serialize_with_indent(&inner, self.config().indent_width)
            .unwrap_or_else(|_| inner.to_host_string())
    }

    pub fn type_name(&self, instance: &Value) -> String {
        self.normalize(instance).type_name()
    }

    /// A built-in singleton or constant by name.
    pub fn constant(&self, name: &str) -> Wrapper {
        if let Some(singleton) = self.realm().get(name) {
            return Wrapper::to_type(singleton.clone());
        }
        match realm::constant(name) {
            Some(value) => Wrapper::to_type(value),
            None => Wrapper::from_error(&BridgeError::NoSuchMember {
                target: "globalThis".to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Run a reporter block and prepare its result for the component
    /// receiving it. Values the registry indirects leave as reference
    /// markers.
    pub fn report(&mut self, block: impl FnOnce(&Bridge) -> Wrapper) -> Exported {
        let wrapper = block(&*self);
        self.export(wrapper)
    }

    /// Like [`report`](Self::report), for a receiver known by type tag.
    /// A registered receiver builds its own value from the result when it
    /// can; indirected values still leave as markers.
    pub fn report_to(&mut self, tag: &str, block: impl FnOnce(&Bridge) -> Wrapper) -> Value {
        let wrapper = block(&*self);
        if !self.registry().should_indirect(wrapper.inner()) {
            if let Some(component) = self.components().get(tag) {
                match component.wrap(wrapper.inner()) {
                    Ok(value) => return value,
                    Err(err) => debug!(%err, tag, "receiver cannot take the value as its own"),
                }
            }
        }
        self.export(wrapper).into_value()
    }

    pub fn define_global_func(&mut self, name: &str, code: &str) -> Wrapper {
        match self.globals_mut().define(name, code) {
            Ok(()) => Wrapper::undefined(),
            Err(err) => {
                warn!(%err, name, "global function rejected");
                Wrapper::from_error(&err)
            }
        }
    }

    pub fn delete_global_func(&mut self, name: &str) -> bool {
        self.globals_mut().delete(name)
    }

    /// Leave the sandbox if the host allows it, or return to it.
    pub fn toggle_sandbox(&mut self) -> ExecMode {
        let next = match self.mode() {
            ExecMode::Unsandboxed => ExecMode::Sandboxed,
            ExecMode::Sandboxed if self.executor().can_unsandbox() => ExecMode::Unsandboxed,
            ExecMode::Sandboxed => {
                warn!("host refused to leave the sandbox");
                ExecMode::Sandboxed
            }
        };
        self.set_mode(next);
        next
    }
}

/// Methods every host value has even when it defines no member of that
/// name.
fn intrinsic(target: &Value, method: &str, args: &[Value]) -> Option<BridgeResult<Value>> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
    let text_arg = |i: usize| arg(i).to_host_string();
    match (target, method) {
        (_, "toString") => Some(Ok(Value::string(target.to_host_string()))),
        (_, "valueOf") => Some(Ok(target.clone())),
        (Value::Object(_), "hasOwnProperty") => {
            let key = text_arg(0);
            Some(Ok(Value::Bool(target.keys().iter().any(|k| **k == *key))))
        }
        (Value::String(s), _) => string_method(s, method, &text_arg),
        (Value::Array(items), _) => {
            let result = match method {
                "push" => items.try_borrow_mut().map(|mut items| {
                    items.extend(args.iter().cloned());
                    Value::Number(items.len() as f64)
                }),
                "pop" => items
                    .try_borrow_mut()
                    .map(|mut items| items.pop().unwrap_or(Value::Undefined)),
                "join" => {
                    let sep = match arg(0) {
                        Value::Undefined => ",".to_string(),
                        other => other.to_host_string(),
                    };
                    items.try_borrow_mut().map(|items| {
                        let parts: Vec<String> = items
                            .iter()
                            .map(|item| {
                                if item.is_nullish() {
                                    String::new()
                                } else {
                                    item.to_host_string()
                                }
                            })
                            .collect();
                        Value::string(parts.join(&sep))
                    })
                }
                "includes" => {
                    let needle = arg(0);
                    items
                        .try_borrow_mut()
                        .map(|items| Value::Bool(items.iter().any(|item| *item == needle)))
                }
                "indexOf" => {
                    let needle = arg(0);
                    items.try_borrow_mut().map(|items| {
                        Value::Number(
                            items
                                .iter()
                                .position(|item| *item == needle)
                                .map(|i| i as f64)
                                .unwrap_or(-1.0),
                        )
                    })
                }
                _ => return None,
            };
            Some(result.map_err(|_| BridgeError::type_error("array is in use")))
        }
        _ => None,
    }
}

fn string_method(
    s: &str,
    method: &str,
    text_arg: &dyn Fn(usize) -> String,
) -> Option<BridgeResult<Value>> {
    let value = match method {
        "toUpperCase" => Value::string(s.to_uppercase()),
        "toLowerCase" => Value::string(s.to_lowercase()),
        "trim" => Value::string(s.trim()),
        "includes" => Value::Bool(s.contains(text_arg(0).as_str())),
        "startsWith" => Value::Bool(s.starts_with(text_arg(0).as_str())),
        "endsWith" => Value::Bool(s.ends_with(text_arg(0).as_str())),
        "split" => {
            let sep = text_arg(0);
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::string(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(Value::string).collect()
            };
            Value::array(parts)
        }
        "charAt" => {
            let index = text_arg(0).parse::<usize>().unwrap_or(0);
            Value::string(s.chars().nth(index).map(String::from).unwrap_or_default())
        }
        _ => return None,
    };
    Some(Ok(value))
}
