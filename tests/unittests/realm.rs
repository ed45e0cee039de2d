// Tests for the built-in realm and its natives
use tether::realm::{self, Realm, SINGLETON_NAMES};
use tether::{Bridge, BridgeConfig, LookupRegistry, Value};

#[test]
fn test_other_realm_singletons_are_not_builtins() {
    let home = Realm::new();
    let elsewhere = Realm::new();
    let mut registry = LookupRegistry::new(&BridgeConfig::default());
    registry.seed_builtins(&home);

    let foreign_math = elsewhere.get("Math").unwrap();
    assert!(registry.builtin_token(foreign_math).is_none());
    assert!(registry.builtin_token(home.get("Math").unwrap()).is_some());
    assert_eq!(elsewhere.singleton_name(foreign_math), Some("Math"));
    assert_eq!(home.singleton_name(foreign_math), None);
}

#[test]
fn test_every_singleton_is_seeded() {
    let bridge = Bridge::new();
    assert_eq!(bridge.registry().len(), SINGLETON_NAMES.len());
    for name in SINGLETON_NAMES {
        let value = bridge.realm().get(name).unwrap();
        let token = bridge.registry().builtin_token(value).unwrap();
        assert_eq!(token.as_str(), format!("jsoop-builtin:{}", name));
    }
}

#[test]
fn test_constants_are_plain_values() {
    assert!(realm::constant("NaN").unwrap().to_number().is_nan());
    assert_eq!(realm::constant("null"), Some(Value::Null));
    assert!(realm::constant("Math").is_none());
}

#[test]
fn test_json_namespace_uses_serializer() {
    let bridge = Bridge::new();
    let json = bridge.realm().get("JSON").unwrap().clone();
    let stringify = json.get("stringify").unwrap();
    let out = bridge
        .call(
            &stringify,
            &json,
            &[Value::array(vec![Value::Number(1.0)]), Value::Null, Value::Number(0.0)],
        )
        .unwrap();
    assert_eq!(out, Value::string("[1]"));

    let parse = json.get("parse").unwrap();
    let err = bridge.call(&parse, &json, &[Value::string("{oops")]).unwrap_err();
    assert_eq!(err.name(), "SyntaxError");
}
