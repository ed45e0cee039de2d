//! Saving and restoring named variables with a project.
//!
//! A snapshot is a JSON object from variable name to persisted wrapper
//! record. Restoring is per slot: one bad record leaves that variable
//! empty and the rest restore normally.

use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::bridge::Bridge;
use crate::wrapper::Wrapper;

/// Persist every variable into one snapshot object, in iteration order.
pub fn save_variables<'a>(
    bridge: &mut Bridge,
    variables: impl IntoIterator<Item = (&'a str, &'a Wrapper)>,
) -> Json {
    let mut snapshot = Map::new();
    for (name, wrapper) in variables {
        snapshot.insert(name.to_string(), bridge.serialize(wrapper));
    }
    debug!(count = snapshot.len(), "saved variables");
    Json::Object(snapshot)
}

/// Restore a snapshot. A slot that does not hold a wrapper record comes
/// back as `None`.
pub fn restore_variables(bridge: &Bridge, snapshot: &Json) -> Vec<(String, Option<Wrapper>)> {
    let Json::Object(slots) = snapshot else {
        warn!("snapshot is not an object, nothing restored");
        return Vec::new();
    };
    slots
        .iter()
        .map(|(name, record)| {
            let restored = bridge.deserialize(record);
            if restored.is_none() {
                warn!(name = name.as_str(), "variable could not be restored");
            }
            (name.clone(), restored)
        })
        .collect()
}
