/// Insertion-ordered mapping of unique names to text
///
/// Used for both named patterns (label -> expression) and custom values
/// (value -> description). Iteration order is the order shown to the operator
/// and the order written to the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    items: Vec<(String, String)>,
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, text)| text.as_str())
    }

    /// Entry at a display position
    pub fn get_index(&self, index: usize) -> Option<(&str, &str)> {
        self.items
            .get(index)
            .map(|(key, text)| (key.as_str(), text.as_str()))
    }

    pub fn first_name(&self) -> Option<&str> {
        self.items.first().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(key, text)| (key.as_str(), text.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(key, _)| key.as_str())
    }

    /// Append a new entry. Returns false, leaving the mapping untouched, if the
    /// name is already present.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.items.push((name, text.into()));
        true
    }

    /// Replace `old` with `new` in place, keeping its position.
    ///
    /// Fails if `old` is missing or if `new` names a different existing entry.
    pub fn rename(&mut self, old: &str, new: impl Into<String>, text: impl Into<String>) -> bool {
        let new = new.into();
        let Some(index) = self.position(old) else {
            return false;
        };
        if new != old && self.contains(&new) {
            return false;
        }
        self.items[index] = (new, text.into());
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.position(name)?;
        Some(self.items.remove(index).1)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|(key, _)| key == name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Entries {
    /// Later duplicates of a name are dropped
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (name, text) in iter {
            entries.insert(name, text);
        }
        entries
    }
}
