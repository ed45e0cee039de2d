use std::any::Any;

use serde_json::Value as Json;

use crate::component::Component;
use crate::error::{BridgeError, BridgeResult};
use crate::serializer;
use crate::value::foreign::NestedJson;
use crate::value::{ForeignValue, Value};

pub const LIST_TAG: &str = "jwArray";

/// Array-like value owned by the list component.
#[derive(Clone)]
pub struct ListValue {
    pub items: Vec<Value>,
}

impl ListValue {
    pub fn new(items: Vec<Value>) -> Self {
        ListValue { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ForeignValue for ListValue {
    fn type_tag(&self) -> &str {
        LIST_TAG
    }

    fn display(&self) -> BridgeResult<String> {
        Ok(format!("[List({})]", self.items.len()))
    }

    fn to_json(&self, nested: &mut NestedJson<'_>) -> BridgeResult<Json> {
        self.items
            .iter()
            .map(|item| nested(item))
            .collect::<BridgeResult<Vec<_>>>()
            .map(Json::Array)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn expect_list(value: &dyn ForeignValue) -> BridgeResult<&ListValue> {
    value
        .as_any()
        .downcast_ref::<ListValue>()
        .ok_or_else(|| {
            BridgeError::component(LIST_TAG, format!("expected a list, got {}", value.type_tag()))
        })
}

pub struct ListComponent;

impl Component for ListComponent {
    fn type_tag(&self) -> &str {
        LIST_TAG
    }

    /// Arrays become lists element for element; any other value becomes
    /// a one-element list.
    fn wrap(&self, value: &Value) -> BridgeResult<Value> {
        if value.downcast_foreign::<ListValue>().is_some() {
            return Ok(value.clone());
        }
        let items = match value {
            Value::Array(items) => items
                .try_borrow()
                .map_err(|_| BridgeError::component(LIST_TAG, "array is being mutated"))?
                .clone(),
            other => vec![other.clone()],
        };
        Ok(Value::foreign(ListValue::new(items)))
    }

    fn unwrap(&self, value: &dyn ForeignValue) -> BridgeResult<Value> {
        Ok(Value::array(expect_list(value)?.items.clone()))
    }

    fn serialize(&self, value: &dyn ForeignValue) -> BridgeResult<Json> {
        let list = expect_list(value)?;
        let mut out = Vec::with_capacity(list.len());
        for item in &list.items {
            out.push(serializer::to_json(item)?.unwrap_or(Json::Null));
        }
        Ok(Json::Array(out))
    }

    fn deserialize(&self, data: &Json) -> BridgeResult<Value> {
        match data {
            Json::Array(items) => Ok(Value::foreign(ListValue::new(
                items.iter().map(serializer::from_json).collect(),
            ))),
            other => Err(BridgeError::component(
                LIST_TAG,
                format!("expected an array, got {}", other),
            )),
        }
    }
}
