//! Deterministic query-string construction.
//!
//! Keys are rendered in the order they were pushed. Pairs whose value is
//! `None` are dropped entirely rather than sent as `key=`.

use url::form_urlencoded::byte_serialize;

#[derive(Debug, Default, Clone)]
pub struct QueryBuilder {
    pairs: Vec<(&'static str, Option<String>)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<V: ToString>(mut self, key: &'static str, value: Option<V>) -> Self {
        self.pairs.push((key, value.map(|v| v.to_string())));
        self
    }

    /// The present keys, in push order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.pairs
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(key, _)| *key)
            .collect()
    }

    /// Render `k=v&k=v` with form-urlencoded values. Empty when no value is present.
    pub fn finish(&self) -> String {
        self.pairs
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(|v| format!("{key}={}", byte_serialize(v.as_bytes()).collect::<String>()))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
