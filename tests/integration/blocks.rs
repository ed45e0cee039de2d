// Block operations driven through a scripted executor
use crate::common::{args, num, setup, ScriptedExecutor};
use tether::companion::ListValue;
use tether::value::{HostFunction, HostObject, PromiseState};
use tether::{ExecMode, Value};

#[test]
fn test_eval_with_prelude_and_binds() {
    let executor = ScriptedExecutor::new().on("return greet(name);", |_, _| Ok(Value::string("hi Ada")));
    let log = executor.log();
    let mut bridge = setup(executor);
    assert!(!bridge.define_global_func("greet", "(n) => 'hi ' + n").is_error());

    let result = bridge.eval_js_with("return greet(name);", &Value::string(r#"{"name": "Ada"}"#));
    assert_eq!(result.inner(), &Value::string("hi Ada"));

    let log = log.borrow();
    let (code, mode) = &log[0];
    assert_eq!(
        code,
        "const greet = (n) => 'hi ' + n\nconst name = \"Ada\";\nreturn greet(name);"
    );
    assert_eq!(*mode, ExecMode::Sandboxed);
}

#[test]
fn test_eval_errors_become_values() {
    let bridge = setup(ScriptedExecutor::new());
    let result = bridge.eval_js("nope()");
    assert!(result.is_error());
    assert!(result.inner().to_host_string().starts_with("Error: execution failed"));

    let run = bridge.run_js("nope()", None);
    assert!(run.is_error());
}

#[test]
fn test_js_boolean_settles_promises() {
    let executor = ScriptedExecutor::new()
        .on("yes", |_, _| {
            Ok(Value::object(HostObject::promise(PromiseState::Fulfilled(num(1.0)))))
        })
        .on("no", |_, _| {
            Ok(Value::object(HostObject::promise(PromiseState::Rejected(Value::Bool(true)))))
        })
        .on("text", |_, _| Ok(Value::string("")));
    let bridge = setup(executor);
    assert!(bridge.js_boolean("yes", None));
    assert!(!bridge.js_boolean("no", None));
    assert!(!bridge.js_boolean("text", None));
    assert!(!bridge.js_boolean("unknown", None));
}

#[test]
fn test_toggle_sandbox_when_allowed() {
    let executor = ScriptedExecutor::new().allow_unsandbox().on("1", |_, _| Ok(num(1.0)));
    let log = executor.log();
    let mut bridge = setup(executor);
    assert_eq!(bridge.toggle_sandbox(), ExecMode::Unsandboxed);
    bridge.eval_js("1");
    assert_eq!(log.borrow()[0].1, ExecMode::Unsandboxed);
    assert_eq!(bridge.toggle_sandbox(), ExecMode::Sandboxed);
}

#[test]
fn test_script_methods_and_classes() {
    let class_src = "class Point { constructor(x) { this.x = x; } }";
    let method_src = "function norm() { return this.x; }";
    let executor = ScriptedExecutor::new()
        .on(class_src, |_, args| {
            let point = HostObject::instance("Point").with_property("x", args[0].clone());
            point.define(
                "norm",
                tether::value::Property::Data(Value::function(HostFunction::script(
                    "function norm() { return this.x; }",
                ))),
            );
            Ok(Value::object(point))
        })
        .on(method_src, |this, _| this.get("x"));
    let bridge = setup(executor);

    let class = Value::function(HostFunction::script(class_src));
    let point = bridge.new_instance(&class, &num(3.0));
    assert_eq!(point.to_display_string(), "[Point]");

    let norm = bridge.call_method(&point.clone().into_value(), "norm", &Value::Undefined);
    assert_eq!(norm.inner(), &num(3.0));

    let not_callable = bridge.call_method(point.inner(), "x", &Value::Undefined);
    assert_eq!(
        not_callable.inner().to_host_string(),
        "TypeError: [Point].x is not a function"
    );
}

#[test]
fn test_await_pending_promise_is_returned() {
    let pending = Value::object(HostObject::promise(PromiseState::Pending));
    let holder = Value::plain_object([(
        "later",
        Value::function(HostFunction::script("function later() {}")),
    )]);
    let captured = pending.clone();
    let executor = ScriptedExecutor::new().on("function later() {}", move |_, _| Ok(captured.clone()));
    let bridge = setup(executor);
    let result = bridge.await_call_method(&holder, "later", &Value::Undefined);
    assert_eq!(result.inner(), &pending);
}

#[test]
fn test_property_blocks_accept_companions() {
    let bridge = setup(ScriptedExecutor::new());
    let target = Value::plain_object([("a", num(1.0))]);

    bridge.set_prop_wrapper(&target, "w", &tether::Wrapper::to_type(num(9.0)).into_value());
    assert_eq!(target.get("w").unwrap(), num(9.0));

    let list = Value::foreign(ListValue::new(vec![num(1.0), num(2.0)]));
    bridge.set_prop_list(&target, "l", &list);
    assert_eq!(bridge.get_prop(&target, "l").to_display_string(), "[Array(2)]");

    bridge.set_prop_record(&target, "r", &Value::plain_object([("z", Value::Null)]));
    assert_eq!(bridge.type_name(&target.get("r").unwrap()), "object");

    let spread = bridge.call_method(&args(&[num(5.0), num(6.0)]), "indexOf", &list);
    assert_eq!(spread.inner(), &num(-1.0));
}

#[test]
fn test_stringify_block_uses_config_indent() {
    use tether::{Bridge, BridgeConfig};
    let bridge = Bridge::with_config(BridgeConfig::new().with_indent_width(4));
    let value = Value::plain_object([("a", args(&[num(1.0)]))]);
    assert_eq!(bridge.stringify(&value), "{\n    \"a\": [\n        1\n    ]\n}");
    let wrapped = tether::Wrapper::to_type(Value::string("s")).into_value();
    assert_eq!(bridge.stringify(&wrapped), "\"s\"");
}
