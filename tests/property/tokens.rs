// Property tests for registry tokens
use std::collections::HashSet;

use proptest::prelude::*;
use tether::realm::Realm;
use tether::value::{HostObject, ObjectKind};
use tether::{BridgeConfig, LookupRegistry, Value, Wrapper};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn minted_tokens_are_distinct(count in 1usize..200) {
        let mut registry = LookupRegistry::new(&BridgeConfig::default());
        let tokens: HashSet<String> = (0..count)
            .map(|_| {
                let set = Value::object(HostObject::new(ObjectKind::Set, "Set"));
                registry.store(Wrapper::to_type(set)).into_string()
            })
            .collect();
        prop_assert_eq!(tokens.len(), count);
        prop_assert_eq!(registry.len(), count);
    }

    #[test]
    fn singleton_tokens_are_fixed(index in 0usize..23, repeats in 1usize..10) {
        let realm = Realm::new();
        let mut registry = LookupRegistry::new(&BridgeConfig::default());
        registry.seed_builtins(&realm);
        let (name, value) = realm.singletons().nth(index).unwrap();
        let before = registry.len();
        for _ in 0..repeats {
            let token = registry.store(Wrapper::to_type(value.clone()));
            prop_assert_eq!(token.as_str(), format!("jsoop-builtin:{}", name));
        }
        prop_assert_eq!(registry.len(), before);
    }
}
