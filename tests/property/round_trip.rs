// Property tests for persistence round trips of plain data
use crate::property::strategies::{arb_json, arb_value};
use proptest::prelude::*;
use tether::serializer;
use tether::{Bridge, Payload, Wrapper};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn plain_data_round_trips(json in arb_json()) {
        let mut bridge = Bridge::new();
        let value = serializer::from_json(&json);
        let payload = bridge.prepare_for_persist(&value);
        prop_assert!(matches!(payload, Payload::Inline(_)), "got {:?}", payload);
        let back = bridge.reconstruct(&payload);
        prop_assert_eq!(
            serializer::to_json(&back).unwrap(),
            serializer::to_json(&value).unwrap()
        );
    }

    #[test]
    fn payload_json_decodes_to_itself(value in arb_value()) {
        let mut bridge = Bridge::new();
        let payload = bridge.prepare_for_persist(&value);
        prop_assert_eq!(Payload::from_json(&payload.to_json()).unwrap(), payload);
    }

    #[test]
    fn wrapper_records_always_restore(value in arb_value()) {
        let mut bridge = Bridge::new();
        let record = bridge.serialize(&Wrapper::to_type(value));
        prop_assert!(bridge.deserialize(&record).is_some());
    }
}
