use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// Insertion-ordered mapping from option name to value.
///
/// Names are unique: inserting an existing name replaces the value in place
/// and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, Value)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((name, value));
        None
    }

    /// Builder-style [`ParameterSet::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value for `name`; unknown names read as [`Value::Absent`].
    pub fn get(&self, name: &str) -> &Value {
        const ABSENT: &Value = &Value::Absent;
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .unwrap_or(ABSENT)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `overrides` on top of `self`; later values win.
    pub fn merge(&mut self, overrides: ParameterSet) {
        for (name, value) in overrides.entries {
            self.insert(name, value);
        }
    }
}

impl FromIterator<(String, Value)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::ParameterSet;
    use crate::value::Value;

    #[test]
    fn insert_replaces_in_place() {
        let mut set = ParameterSet::new().with("name", "t1").with("ttl", 64);
        let previous = set.insert("name", "t2");

        assert_eq!(previous, Some(Value::str("t1")));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["name", "ttl"]);
        assert_eq!(set.get("name"), &Value::str("t2"));
    }

    #[test]
    fn unknown_names_read_as_absent() {
        let set = ParameterSet::new();
        assert!(set.get("ttl").is_absent());
        assert!(!set.contains("ttl"));
    }

    #[test]
    fn merge_overrides_existing_values() {
        let mut base = ParameterSet::new().with("ttl", 64).with("disabled", false);
        base.merge(ParameterSet::new().with("ttl", 42).with("copy_tos", true));

        assert_eq!(base.get("ttl"), &Value::Int(42));
        assert_eq!(base.len(), 3);
    }
}
