// Property tests for display totality
use crate::property::strategies::{arb_value, cyclic, hostile};
use proptest::prelude::*;
use tether::{Bridge, Value, Wrapper};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn display_never_fails(value in arb_value()) {
        let wrapper = Wrapper::to_type(value);
        let label = wrapper.to_display_string();
        prop_assert!(label.len() < 4096);
        let _ = wrapper.to_debug_string();
        let _ = wrapper.to_list_editor();
        let _ = wrapper.type_name();
    }

    #[test]
    fn nested_wrappers_flatten(depth in 1usize..8) {
        let mut value = Value::string("core");
        for _ in 0..depth {
            value = Wrapper::to_type(value).into_value();
        }
        let wrapped = Wrapper::to_type(value);
        prop_assert_eq!(wrapped.inner(), &Value::string("core"));
    }

    #[test]
    fn block_stringify_is_total(value in arb_value()) {
        let bridge = Bridge::new();
        let _ = bridge.stringify(&value);
    }
}

#[test]
fn test_awkward_values_have_labels() {
    assert_eq!(Wrapper::to_type(hostile()).to_display_string(), "[unprintable]");
    assert_eq!(Wrapper::to_type(cyclic()).to_display_string(), "[Object]");
}
