use crate::types::Value;

/// Named scalar parameters in insertion order.
///
/// Names are stored bare (`x`, not `:x`) and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSet {
    entries: Vec<(String, Value)>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combines slot-bound parameters with a bulk map.
    ///
    /// Every slot-bound entry is kept, in slot order. Bulk entries are
    /// appended only for names no slot declares, so a slot always wins.
    pub fn merged(slot_bound: &ParamSet, bulk: &ParamSet) -> ParamSet {
        let mut merged = slot_bound.clone();
        for (name, value) in bulk.iter() {
            if !merged.contains(name) {
                merged.entries.push((name.to_string(), value.clone()));
            }
        }
        merged
    }

    /// Sets `name`, returning the value it replaces.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = ParamSet::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_values_win_over_bulk() {
        let slots: ParamSet = [("x", 1)].into_iter().collect();
        let bulk: ParamSet = [("x", 2), ("y", 3)].into_iter().collect();

        let merged = ParamSet::merged(&slots, &bulk);

        assert_eq!(merged.get("x"), Some(&Value::Int(1)));
        assert_eq!(merged.get("y"), Some(&Value::Int(3)));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merged_keeps_slot_order_first() {
        let slots: ParamSet = [("b", 1), ("a", 2)].into_iter().collect();
        let bulk: ParamSet = [("c", 3)].into_iter().collect();

        let merged = ParamSet::merged(&slots, &bulk);
        let names: Vec<&str> = merged.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn merged_with_empty_sides() {
        let some: ParamSet = [("x", 1)].into_iter().collect();
        assert_eq!(ParamSet::merged(&ParamSet::new(), &some), some);
        assert_eq!(ParamSet::merged(&some, &ParamSet::new()), some);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut params = ParamSet::new();
        params.insert("x", 1);
        params.insert("y", 2);

        assert_eq!(params.insert("x", "one"), Some(Value::Int(1)));
        assert_eq!(params.iter().next(), Some(("x", &Value::Text("one".into()))));
    }

    #[test]
    fn names_are_case_sensitive() {
        let params: ParamSet = [("X", 1)].into_iter().collect();
        assert!(!params.contains("x"));
    }

    #[test]
    fn remove_drops_entry() {
        let mut params: ParamSet = [("x", 1)].into_iter().collect();
        assert_eq!(params.remove("x"), Some(Value::Int(1)));
        assert!(params.is_empty());
        assert_eq!(params.remove("x"), None);
    }
}
