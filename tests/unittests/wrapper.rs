// Tests for the value wrapper's display and projection surfaces
use tether::error::BridgeError;
use tether::value::{HostFunction, HostObject, ObjectKind, PromiseState};
use tether::wrapper::UNPRINTABLE;
use tether::{Value, Wrapper};

#[test]
fn test_scalar_labels() {
    let cases = [
        (Value::Undefined, "undefined"),
        (Value::Null, "null"),
        (Value::Bool(false), "false"),
        (Value::Number(3.5), "3.5"),
        (Value::Number(-0.0), "0"),
        (Value::Number(f64::NAN), "NaN"),
        (Value::bigint(12345678901234567890u64), "12345678901234567890"),
        (Value::string("plain text"), "plain text"),
    ];
    for (value, label) in cases {
        assert_eq!(Wrapper::to_type(value).to_display_string(), label);
    }
}

#[test]
fn test_composite_labels_are_bounded() {
    let big = Value::array((0..10_000).map(|i| Value::Number(i as f64)).collect());
    assert_eq!(Wrapper::to_type(big).to_display_string(), "[Array(10000)]");

    let map = Value::object(HostObject::new(ObjectKind::Map, "Map"));
    assert_eq!(Wrapper::to_type(map).to_display_string(), "[Map]");

    let pending = Value::object(HostObject::promise(PromiseState::Pending));
    assert_eq!(Wrapper::to_type(pending).to_display_string(), "[Promise]");

    let point = Value::object(HostObject::instance("Point"));
    assert_eq!(Wrapper::to_type(point).to_display_string(), "[Point]");
}

#[test]
fn test_function_labels() {
    let named = Value::function(HostFunction::script("function greet(who) { return who; }"));
    assert_eq!(Wrapper::to_type(named).to_display_string(), "[Function greet]");

    let lambda = Value::function(HostFunction::script("(x) => x"));
    assert_eq!(Wrapper::to_type(lambda).to_display_string(), "[Function anonymous]");
}

#[test]
fn test_hostile_constructor_is_unprintable() {
    let hostile = HostObject::plain().with_getter("constructor", || {
        Err(BridgeError::thrown("Error", "no peeking"))
    });
    let wrapper = Wrapper::to_type(Value::object(hostile));
    assert_eq!(wrapper.to_display_string(), UNPRINTABLE);
    assert!(wrapper.try_display().is_err());
}

#[test]
fn test_never_double_wraps() {
    let first = Wrapper::to_type(Value::string("x"));
    let second = Wrapper::to_type(first.clone().into_value());
    let third = Wrapper::new(second.clone().into_value());
    assert_eq!(third.inner(), &Value::string("x"));
    assert!(third.inner().downcast_foreign::<Wrapper>().is_none());
    assert_eq!(first, third);
}

#[test]
fn test_list_editor_text() {
    let text = Wrapper::to_type(Value::string("hello"));
    assert_eq!(text.to_list_editor(), "hello");
    let arr = Wrapper::to_type(Value::array(vec![Value::Number(1.0), Value::Null]));
    assert_eq!(arr.to_list_editor(), "[1,null]");

    assert_eq!(Wrapper::from_list_editor("[1,2]").to_display_string(), "[Array(2)]");
    assert_eq!(Wrapper::from_list_editor("not json").inner(), &Value::string("not json"));
}

#[test]
fn test_type_names() {
    assert_eq!(Wrapper::null().type_name(), "null");
    assert_eq!(Wrapper::undefined().type_name(), "undefined");
    assert_eq!(Wrapper::to_type(Value::array(vec![])).type_name(), "array");
    assert_eq!(Wrapper::to_type(Value::Number(1.0)).type_name(), "number");
    assert_eq!(Wrapper::to_type(Value::plain_object([("a", Value::Null)])).type_name(), "object");
}

#[test]
fn test_error_wrappers() {
    let err = Wrapper::from_error(&BridgeError::NotCallable("x".to_string()));
    assert!(err.is_error());
    assert_eq!(err.inner().to_host_string(), "TypeError: x is not a function");
    assert_eq!(err.to_display_string(), "[TypeError]");
}
