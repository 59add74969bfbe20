//! Ordered, multi-valued, case-insensitive string header store.
//!
//! Keys are normalised to ASCII lowercase on every access, so `X-To` and
//! `x-to` name the same entry. Values under a key keep insertion order, and
//! keys keep the order in which they were first added.

/// Header store. Backing storage for message routing metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(String, Vec<String>)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Header::set`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// First value for `name`, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.find(name)
            .and_then(|i| self.entries[i].1.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values for `name`, in insertion order.
    pub fn values(&self, name: &str) -> &[String] {
        self.find(name)
            .map(|i| self.entries[i].1.as_slice())
            .unwrap_or(&[])
    }

    /// Replace every value for `name` with a single value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.find(name) {
            Some(i) => self.entries[i].1 = vec![value.into()],
            None => self.entries.push((normalise(name), vec![value.into()])),
        }
    }

    /// Append a value for `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        match self.find(name) {
            Some(i) => self.entries[i].1.push(value.into()),
            None => self.entries.push((normalise(name), vec![value.into()])),
        }
    }

    /// Remove `name` and all of its values.
    pub fn delete(&mut self, name: &str) {
        if let Some(i) = self.find(name) {
            self.entries.remove(i);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

fn normalise(name: &str) -> String {
    name.to_ascii_lowercase()
}
