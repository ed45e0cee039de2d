// Tests for the lookup registry: classification, tokens, singletons
use tether::realm::Realm;
use tether::value::{HostFunction, HostObject, ObjectKind, PromiseState};
use tether::{BridgeConfig, BridgeError, LookupRegistry, Value, Wrapper};

fn seeded() -> (Realm, LookupRegistry) {
    let realm = Realm::new();
    let mut registry = LookupRegistry::new(&BridgeConfig::default());
    registry.seed_builtins(&realm);
    (realm, registry)
}

#[test]
fn test_singleton_tokens_are_stable() {
    let (realm, mut registry) = seeded();
    let math = realm.get("Math").unwrap().clone();
    let first = registry.store(Wrapper::to_type(math.clone()));
    let second = registry.store(Wrapper::to_type(math));
    assert_eq!(first, second);
    assert_eq!(first.as_str(), "jsoop-builtin:Math");
    assert!(registry.is_builtin_token(first.as_str()));
}

#[test]
fn test_reseeding_is_identical() {
    let (realm, registry) = seeded();
    let mut again = LookupRegistry::new(&BridgeConfig::default());
    again.seed_builtins(&realm);
    again.seed_builtins(&realm);
    assert_eq!(registry.len(), again.len());
    let global = realm.global();
    assert_eq!(registry.builtin_token(global), again.builtin_token(global));
}

#[test]
fn test_classification() {
    let (realm, registry) = seeded();
    let indirect = [
        realm.get("JSON").unwrap().clone(),
        Value::function(HostFunction::native("helper", |_, _| Ok(Value::Null))),
        Value::object(HostObject::new(ObjectKind::WeakMap, "WeakMap")),
        Value::object(HostObject::promise(PromiseState::Pending)),
        Value::object(HostObject::error("Error", "x")),
        Value::object(HostObject::new(ObjectKind::Node, "HTMLDivElement")),
        Value::plain_object([("f", Value::function(HostFunction::script("() => 1")))]),
        Value::object(HostObject::plain().with_getter("bad", || {
            Err(BridgeError::thrown("Error", "nope"))
        })),
    ];
    for value in &indirect {
        assert!(registry.should_indirect(value), "should indirect {:?}", value);
    }

    let inline = [
        Value::Number(1.0),
        Value::string("s"),
        Value::Null,
        Value::plain_object([("name", Value::string("Alice"))]),
        Value::array(vec![Value::Bool(true)]),
        Value::function(HostFunction::script("function f() { return 1; }")),
    ];
    for value in &inline {
        assert!(!registry.should_indirect(value), "should inline {:?}", value);
    }
}

#[test]
fn test_minted_tokens() {
    let (_, mut registry) = seeded();
    let before = registry.len();
    let a = registry.store(Wrapper::to_type(Value::object(HostObject::new(ObjectKind::Set, "Set"))));
    let b = registry.store(Wrapper::to_type(Value::object(HostObject::new(ObjectKind::Set, "Set"))));
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("jsoop-ref-"));
    assert_eq!(registry.len(), before + 2);
    assert_eq!(registry.resolve(a.as_str()).unwrap().to_display_string(), "[Set]");
    assert!(registry.resolve("jsoop-ref-nope").is_none());
}

#[test]
fn test_release_policy() {
    let (realm, mut registry) = seeded();
    let token = registry.store(Wrapper::to_type(Value::object(HostObject::instance("Thing"))));
    assert!(registry.release(token.as_str()));
    assert!(!registry.release(token.as_str()));
    assert!(!registry.contains(token.as_str()));

    let math = registry.store(Wrapper::to_type(realm.get("Math").unwrap().clone()));
    assert!(!registry.release(math.as_str()));
    assert!(registry.contains(math.as_str()));
}

#[test]
fn test_custom_prefixes() {
    let config = BridgeConfig::new()
        .with_token_prefix("ref")
        .with_builtin_prefix("core");
    let realm = Realm::new();
    let mut registry = LookupRegistry::new(&config);
    registry.seed_builtins(&realm);
    let token = registry.store(Wrapper::to_type(realm.get("Reflect").unwrap().clone()));
    assert_eq!(token.as_str(), "core:Reflect");
    let minted = registry.store(Wrapper::to_type(Value::Number(1.0)));
    assert!(minted.as_str().starts_with("ref-"));
}
