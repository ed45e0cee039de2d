// Tests for the safe serializer
use tether::error::BridgeError;
use tether::serializer::{self, CIRCULAR_MARKER};
use tether::value::{HostObject, MAX_SAFE_INTEGER};
use tether::Value;

#[test]
fn test_indented_output() {
    let value = Value::plain_object([
        ("name", Value::string("Alice")),
        ("tags", Value::array(vec![Value::Number(1.0), Value::Bool(false)])),
    ]);
    assert_eq!(
        serializer::serialize(&value).unwrap(),
        "{\n  \"name\": \"Alice\",\n  \"tags\": [\n    1,\n    false\n  ]\n}"
    );
    assert_eq!(
        serializer::serialize_with_indent(&value, 0).unwrap(),
        r#"{"name":"Alice","tags":[1,false]}"#
    );
}

#[test]
fn test_bigint_boundary() {
    let safe = Value::bigint(MAX_SAFE_INTEGER);
    let unsafe_ = Value::bigint(MAX_SAFE_INTEGER + 1);
    assert_eq!(serializer::serialize(&safe).unwrap(), "9007199254740991");
    assert_eq!(serializer::serialize(&unsafe_).unwrap(), "\"9007199254740992\"");
    assert_eq!(
        serializer::deserialize("\"9007199254740992\"").unwrap(),
        Value::string("9007199254740992")
    );
}

#[test]
fn test_self_reference_is_marked() {
    let object = HostObject::plain().with_property("id", Value::Number(1.0));
    let value = Value::object(object);
    value.set("me", value.clone()).unwrap();
    let text = serializer::serialize(&value).unwrap();
    let back = serializer::deserialize(&text).unwrap();
    assert_eq!(back.get("me").unwrap(), Value::string(CIRCULAR_MARKER));
    assert_eq!(back.get("id").unwrap(), Value::Number(1.0));
}

#[test]
fn test_getter_failure_fails_whole_call() {
    let hostile = HostObject::plain()
        .with_property("ok", Value::Number(1.0))
        .with_getter("boom", || Err(BridgeError::thrown("Error", "hostile")));
    let value = Value::object(hostile);
    assert!(serializer::serialize(&value).is_err());
    assert_eq!(serializer::stringify(&value), "[object Object]");
}

#[test]
fn test_non_json_members_are_dropped() {
    let value = Value::plain_object([("u", Value::Undefined), ("n", Value::Number(f64::NAN))]);
    assert_eq!(
        serializer::serialize_with_indent(&value, 0).unwrap(),
        r#"{"n":null}"#
    );
    assert_eq!(serializer::serialize(&Value::Undefined).unwrap(), "null");
}
