use crate::runtime::value::Value;
use std::collections::HashMap;

/// Caller-supplied variable values for one evaluation. An entry may hold an
/// explicit null, which is distinct from an empty string; a missing entry
/// resolves the same way an explicit null does.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    entries: HashMap<String, Option<String>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), Some(value.into()));
    }

    pub fn insert_null(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), None);
    }

    /// Resolves a variable. Absent and explicitly-null entries both yield
    /// [`Value::Null`]; an empty string is a valid non-null value.
    pub fn resolve(&self, name: &str) -> Value {
        match self.entries.get(name) {
            Some(Some(text)) => Value::Str(text.clone()),
            Some(None) | None => Value::Null,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Option<V>)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_explicit_null_both_resolve_to_null() {
        let mut bindings = Bindings::new();
        bindings.insert_null("a");
        assert_eq!(bindings.resolve("a"), Value::Null);
        assert_eq!(bindings.resolve("missing"), Value::Null);
        assert!(bindings.contains("a"));
        assert!(!bindings.contains("missing"));
    }

    #[test]
    fn empty_string_is_distinct_from_null() {
        let mut bindings = Bindings::new();
        bindings.insert("a", "");
        assert_eq!(bindings.resolve("a"), Value::Str(String::new()));
    }
}
