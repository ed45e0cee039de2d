// Saving and restoring a whole project's variables
use serde_json::json;

use tether::value::{HostFunction, HostObject, ObjectKind};
use tether::{restore_variables, save_variables, Bridge, Value, Wrapper};

#[test]
fn test_project_round_trip_in_one_session() {
    let mut bridge = Bridge::new();
    let vars = vec![
        ("alice", Wrapper::to_type(Value::plain_object([("name", Value::string("Alice"))]))),
        ("json", Wrapper::to_type(bridge.realm().get("JSON").unwrap().clone())),
        ("weak", Wrapper::to_type(Value::object(HostObject::new(ObjectKind::WeakSet, "WeakSet")))),
        ("f", Wrapper::to_type(Value::function(HostFunction::script("(a) => a * 2")))),
    ];
    let snapshot = save_variables(&mut bridge, vars.iter().map(|(n, w)| (*n, w)));
    let keys: Vec<&str> = snapshot.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["alice", "json", "weak", "f"]);

    let restored = restore_variables(&bridge, &snapshot);
    let labels: Vec<String> = restored
        .iter()
        .map(|(_, w)| w.as_ref().unwrap().to_display_string())
        .collect();
    assert_eq!(labels, vec!["[Object]", "[JSON]", "[WeakSet]", "[Function anonymous]"]);
    assert_eq!(restored[2].1.as_ref().unwrap(), &vars[2].1);
}

#[test]
fn test_restore_in_fresh_session_is_tolerant() {
    let snapshot = json!({
        "n": { "wrapped": { "_json": "1" } },
        "math": { "wrapped": { "_ref": "jsoop-builtin:Math" } },
        "gone": { "wrapped": { "_ref": "jsoop-ref-1-abc" } },
        "alien": { "wrapped": { "_nestedCustom": true, "typeId": "unknownThing", "data": 1 } },
        "text": { "wrapped": { "_string": "[object Object]" } },
        "empty": {},
        "bogus": "not a record",
    });
    let bridge = Bridge::new();
    let restored = restore_variables(&bridge, &snapshot);
    let labels: Vec<(String, Option<String>)> = restored
        .into_iter()
        .map(|(name, w)| (name, w.map(|w| w.to_display_string())))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("n".to_string(), Some("1".to_string())),
            ("math".to_string(), Some("[Math]".to_string())),
            ("gone".to_string(), Some("[Missing reference jsoop-ref-1-abc]".to_string())),
            ("alien".to_string(), Some("null".to_string())),
            ("text".to_string(), Some("[object Object]".to_string())),
            ("empty".to_string(), Some("null".to_string())),
            ("bogus".to_string(), None),
        ]
    );
}

#[test]
fn test_resaving_keeps_references_from_other_sessions() {
    let saved = json!({
        "gone": { "wrapped": { "_ref": "jsoop-ref-7-old" } },
        "math": { "wrapped": { "_ref": "jsoop-builtin:Math" } },
    });
    let mut bridge = Bridge::new();
    let loaded: Vec<(String, Wrapper)> = restore_variables(&bridge, &saved)
        .into_iter()
        .map(|(name, w)| (name, w.unwrap()))
        .collect();
    let resaved = save_variables(&mut bridge, loaded.iter().map(|(n, w)| (n.as_str(), w)));
    assert_eq!(resaved, saved);
}
