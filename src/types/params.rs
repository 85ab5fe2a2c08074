//! Request parameters
//!
//! An immutable, ordered parameter bag. Each operation builds one, hands it to
//! the signer by value, and never mutates a shared map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::safe::value_to_string;

/// Ordered (by key) request parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Params(Map::new())
    }

    /// Params from a JSON object; anything else yields an empty bag
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Params(map),
            _ => Params::new(),
        }
    }

    /// Copy with `key` set to `value`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Copy with `key` set only when `value` is present
    pub fn with_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Copy without the given keys
    pub fn omit(mut self, keys: &[&str]) -> Self {
        for key in keys {
            self.0.remove(*key);
        }
        self
    }

    /// `other` layered over `self`; keys in `other` win
    pub fn merge(mut self, other: &Params) -> Self {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Scalar parameter rendered as a string
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_to_string)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Substitute `{name}` placeholders in `path`
    ///
    /// Returns the imploded path and the parameters that were not consumed.
    pub fn implode_path(&self, path: &str) -> (String, Params) {
        let mut imploded = path.to_string();
        let mut rest = self.clone();
        for (key, value) in &self.0 {
            let placeholder = format!("{{{key}}}");
            if imploded.contains(&placeholder) {
                let rendered = value_to_string(value).unwrap_or_default();
                imploded = imploded.replace(&placeholder, &rendered);
                rest.0.remove(key);
            }
        }
        (imploded, rest)
    }

    /// URL-encoded `k=v&...` in key order; nulls and nested values are skipped
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .filter_map(|(k, v)| {
                value_to_string(v).map(|s| {
                    format!("{}={}", urlencoding::encode(k), urlencoding::encode(&s))
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_is_non_destructive() {
        let base = Params::new().with("currency", "btc");
        let extended = base.clone().with("qty", "1");
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.get_string("qty").as_deref(), Some("1"));
    }

    #[test]
    fn test_omit_and_merge() {
        let params = Params::from_value(json!({"a": 1, "b": 2, "c": null}));
        let omitted = params.clone().omit(&["a"]);
        assert!(!omitted.contains("a"));
        assert!(!omitted.contains("c"));

        let merged = params.merge(&Params::new().with("a", 9));
        assert_eq!(merged.get("a"), Some(&json!(9)));
    }

    #[test]
    fn test_implode_path() {
        let params = Params::new().with("cointype", "btc").with("amount", "0.1");
        let (path, rest) = params.implode_path("orders/{cointype}");
        assert_eq!(path, "orders/btc");
        assert!(!rest.contains("cointype"));
        assert!(rest.contains("amount"));
    }

    #[test]
    fn test_query_string_is_sorted_and_encoded() {
        let params = Params::new()
            .with("product_code", "BTC_JPY")
            .with("count", 100)
            .with("after", "a b");
        assert_eq!(
            params.to_query_string(),
            "after=a%20b&count=100&product_code=BTC_JPY"
        );
    }
}
