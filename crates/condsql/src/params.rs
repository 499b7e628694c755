//! Named parameter storage.

use serde::Serialize;

use crate::value::Value;

/// Strip the `@` prefix and backticks from a parameter token.
pub(crate) fn clean_name(name: &str) -> String {
    name.trim_start_matches('@').replace('`', "")
}

/// An ordered set of named parameters.
///
/// Names are stored without the `@` prefix. [`add`](Self::add) overwrites a
/// binding with the same name; [`merge`](Self::merge) appends, so a name may
/// appear more than once and [`get`](Self::get) returns the last binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Params {
    items: Vec<(String, Value)>,
}

impl Params {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any existing binding of the same name.
    pub fn add(&mut self, name: &str, value: impl Into<Value>) {
        let name = clean_name(name);
        let value = value.into();
        if let Some(slot) = self.items.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.items.push((name, value));
        }
    }

    /// Append every field of `object` as a parameter.
    pub fn merge(&mut self, object: &serde_json::Map<String, serde_json::Value>) {
        for (name, value) in object {
            self.items.push((clean_name(name), Value::from(value.clone())));
        }
    }

    /// The last value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = clean_name(name);
        self.items
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Parameter names in binding order.
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
