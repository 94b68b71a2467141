use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{now_ms, Action, Attribute, Sample};

/// An action occurrence plus its attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    timestamp: u64,
    action: Action,
    attributes: BTreeMap<Attribute, Value>,
}

impl Event {
    pub fn new(action: Action) -> Self {
        Self {
            timestamp: now_ms(),
            action,
            attributes: BTreeMap::new(),
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn get(&self, attribute: &Attribute) -> Option<&Value> {
        if !attribute.is_usable() {
            return None;
        }
        self.attributes.get(attribute)
    }

    /// Set an attribute, replacing any previous value. Unusable keys are ignored.
    pub fn set(&mut self, attribute: Attribute, value: impl Into<Value>) {
        if attribute.is_usable() {
            self.attributes.insert(attribute, value.into());
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove(&mut self, attribute: &Attribute) -> bool {
        attribute.is_usable() && self.attributes.remove(attribute).is_some()
    }

    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.get(attribute).is_some()
    }

    pub fn get_u64(&self, attribute: &Attribute) -> Option<u64> {
        self.get(attribute).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, attribute: &Attribute) -> Option<bool> {
        self.get(attribute).and_then(Value::as_bool)
    }

    pub fn get_str(&self, attribute: &Attribute) -> Option<&str> {
        self.get(attribute).and_then(Value::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&Attribute, &Value)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Sample for Event {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }
}
