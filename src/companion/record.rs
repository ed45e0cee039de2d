use std::any::Any;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::component::Component;
use crate::error::{BridgeError, BridgeResult};
use crate::serializer;
use crate::value::foreign::NestedJson;
use crate::value::{ForeignValue, HostObject, Property, Value};

pub const RECORD_TAG: &str = "dogeiscutObject";

/// Ordered key/value record owned by the record component.
#[derive(Clone)]
pub struct RecordValue {
    pub entries: Vec<(Rc<str>, Value)>,
}

impl RecordValue {
    pub fn new(entries: Vec<(Rc<str>, Value)>) -> Self {
        RecordValue { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ForeignValue for RecordValue {
    fn type_tag(&self) -> &str {
        RECORD_TAG
    }

    fn display(&self) -> BridgeResult<String> {
        Ok(format!("[Record({})]", self.entries.len()))
    }

    fn to_json(&self, nested: &mut NestedJson<'_>) -> BridgeResult<Json> {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.entries {
            map.insert(key.to_string(), nested(value)?);
        }
        Ok(Json::Object(map))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn expect_record(value: &dyn ForeignValue) -> BridgeResult<&RecordValue> {
    value
        .as_any()
        .downcast_ref::<RecordValue>()
        .ok_or_else(|| {
            BridgeError::component(
                RECORD_TAG,
                format!("expected a record, got {}", value.type_tag()),
            )
        })
}

pub struct RecordComponent;

impl Component for RecordComponent {
    fn type_tag(&self) -> &str {
        RECORD_TAG
    }

    /// Only objects convert; accessors are read once, at wrap time.
    fn wrap(&self, value: &Value) -> BridgeResult<Value> {
        if value.downcast_foreign::<RecordValue>().is_some() {
            return Ok(value.clone());
        }
        let Value::Object(object) = value else {
            return Err(BridgeError::component(
                RECORD_TAG,
                format!("cannot make a record from {}", value.type_of()),
            ));
        };
        let mut entries = Vec::with_capacity(object.len());
        for (key, property) in object.properties()? {
            let member = match property {
                Property::Data(member) => member,
                Property::Accessor(getter) => getter()?,
            };
            entries.push((key, member));
        }
        Ok(Value::foreign(RecordValue::new(entries)))
    }

    fn unwrap(&self, value: &dyn ForeignValue) -> BridgeResult<Value> {
        let record = expect_record(value)?;
        let object = HostObject::plain();
        for (key, member) in &record.entries {
            object.define(key, Property::Data(member.clone()));
        }
        Ok(Value::object(object))
    }

    fn serialize(&self, value: &dyn ForeignValue) -> BridgeResult<Json> {
        let record = expect_record(value)?;
        let mut map = serde_json::Map::new();
        for (key, member) in &record.entries {
            if let Some(json) = serializer::to_json(member)? {
                map.insert(key.to_string(), json);
            }
        }
        Ok(Json::Object(map))
    }

    fn deserialize(&self, data: &Json) -> BridgeResult<Value> {
        match data {
            Json::Object(map) => Ok(Value::foreign(RecordValue::new(
                map.iter()
                    .map(|(key, item)| (Rc::from(key.as_str()), serializer::from_json(item)))
                    .collect(),
            ))),
            other => Err(BridgeError::component(
                RECORD_TAG,
                format!("expected an object, got {}", other),
            )),
        }
    }
}
