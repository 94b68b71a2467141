use std::collections::HashMap;

use serde_json::Value;

use crate::model::{Attribute, Event, TrackerId};

/// Zero-argument accessor pulling live player state.
pub type Getter = Box<dyn Fn() -> Option<Value> + Send>;

/// Two-level table `(tracker, attribute) -> getter`.
#[derive(Default)]
pub struct GetterRegistry {
    getters: HashMap<TrackerId, HashMap<Attribute, Getter>>,
}

impl GetterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a getter, replacing any previous one for the same key.
    pub fn register(&mut self, attribute: Attribute, getter: Getter, tracker_id: TrackerId) {
        if !attribute.is_usable() {
            return;
        }
        self.getters
            .entry(tracker_id)
            .or_default()
            .insert(attribute, getter);
    }

    pub fn unregister(&mut self, attribute: &Attribute, tracker_id: TrackerId) -> bool {
        let Some(table) = self.getters.get_mut(&tracker_id) else {
            return false;
        };
        let removed = table.remove(attribute).is_some();
        if table.is_empty() {
            self.getters.remove(&tracker_id);
        }
        removed
    }

    /// Drop every getter of a tracker. Returns how many were removed.
    pub fn clear_tracker(&mut self, tracker_id: TrackerId) -> usize {
        self.getters.remove(&tracker_id).map_or(0, |t| t.len())
    }

    /// Call a getter. A missing getter and a JSON `null` both read as absent.
    pub fn call(&self, attribute: &Attribute, tracker_id: TrackerId) -> Option<Value> {
        let getter = self.getters.get(&tracker_id)?.get(attribute)?;
        getter().filter(|v| !v.is_null())
    }

    /// Call a getter and stamp its value onto the event. Returns `true` if stamped.
    pub fn apply(&self, attribute: &Attribute, event: &mut Event, tracker_id: TrackerId) -> bool {
        match self.call(attribute, tracker_id) {
            Some(value) => {
                event.set(attribute.clone(), value);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, tracker_id: TrackerId) -> usize {
        self.getters.get(&tracker_id).map_or(0, HashMap::len)
    }
}

impl std::fmt::Debug for GetterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (id, table) in &self.getters {
            let names: Vec<&str> = table.keys().map(Attribute::name).collect();
            map.entry(id, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;
    use serde_json::json;

    const T0: TrackerId = TrackerId(0);
    const T1: TrackerId = TrackerId(1);

    #[test]
    fn test_register_and_call() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::POSITION, Box::new(|| Some(json!(1500))), T0);
        assert_eq!(reg.call(&Attribute::POSITION, T0), Some(json!(1500)));
        assert_eq!(reg.call(&Attribute::POSITION, T1), None);
    }

    #[test]
    fn test_lookup_by_runtime_name() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::TITLE, Box::new(|| Some(json!("Big Buck Bunny"))), T0);
        assert!(reg.call(&Attribute::new("title"), T0).is_some());
    }

    #[test]
    fn test_null_reads_as_absent() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::AD_SYSTEM, Box::new(|| Some(Value::Null)), T0);
        let mut event = Event::new(Action::AD_BEGIN);
        assert!(!reg.apply(&Attribute::AD_SYSTEM, &mut event, T0));
        assert!(!event.contains(&Attribute::AD_SYSTEM));
    }

    #[test]
    fn test_apply_stamps_event() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::IS_MUTED, Box::new(|| Some(json!(true))), T1);
        let mut event = Event::new(Action::PING);
        assert!(reg.apply(&Attribute::IS_MUTED, &mut event, T1));
        assert_eq!(event.get_bool(&Attribute::IS_MUTED), Some(true));
    }

    #[test]
    fn test_unregister() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::VOLUME, Box::new(|| Some(json!(80))), T0);
        assert!(reg.unregister(&Attribute::VOLUME, T0));
        assert!(!reg.unregister(&Attribute::VOLUME, T0));
        assert_eq!(reg.count(T0), 0);
    }

    #[test]
    fn test_clear_tracker_leaves_others() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::VOLUME, Box::new(|| Some(json!(80))), T0);
        reg.register(Attribute::SOURCE, Box::new(|| Some(json!("a.m3u8"))), T0);
        reg.register(Attribute::VOLUME, Box::new(|| Some(json!(10))), T1);
        assert_eq!(reg.clear_tracker(T0), 2);
        assert_eq!(reg.count(T1), 1);
    }

    #[test]
    fn test_unusable_attribute_not_registered() {
        let mut reg = GetterRegistry::new();
        reg.register(Attribute::new(""), Box::new(|| Some(json!(1))), T0);
        assert_eq!(reg.count(T0), 0);
    }
}
