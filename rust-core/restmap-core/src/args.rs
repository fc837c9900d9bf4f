//! # Path Arguments
//!
//! Placeholder bindings extracted from a request path. Values are kept as
//! the raw path text; handlers convert them with [`Args::parse`].

use std::str::FromStr;

/// Placeholder name to matched segment value, in template order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    bindings: Vec<(String, String)>,
}

impl Args {
    /// Create an empty binding set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`
    ///
    /// A later binding for the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.bindings.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.bindings.push((name, value)),
        }
    }

    /// Raw value bound to `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value bound to `name`, converted with `FromStr`
    ///
    /// Returns `None` if the name is unbound or conversion fails.
    #[must_use]
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Iterate bindings in template order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}
