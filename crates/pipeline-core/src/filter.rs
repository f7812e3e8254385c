//! Filter sets narrowing which records contribute to a metric.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ContractError, Result};

/// Supported filter dimensions.
pub const FILTER_KEYS: [&str; 4] = ["set_aside", "stage", "state", "status"];

/// A validated, order-independent set of filter constraints.
///
/// Keys are restricted to [`FILTER_KEYS`]. Values are trimmed and
/// lowercased so that `TX` and ` tx ` select the same records and share
/// a cache entry. The backing map is sorted, which makes the canonical
/// serialization independent of insertion order.
///
/// # Example
///
/// ```
/// use pipeline_core::FilterSet;
///
/// let a = FilterSet::from_pairs([("stage", "bidding"), ("state", "TX")]).unwrap();
/// let b = FilterSet::from_pairs([("state", "tx"), ("stage", "Bidding")]).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.canonical(), r#"{"stage":"bidding","state":"tx"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter set from key/value pairs, validating each one.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.insert(key.as_ref(), value.as_ref())?;
        }
        Ok(set)
    }

    /// Adds a constraint, replacing any previous value for the key.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim();
        if !FILTER_KEYS.contains(&key) {
            return Err(ContractError::UnknownFilter {
                key: key.to_string(),
                expected: FILTER_KEYS.join(", "),
            });
        }

        let value = value.trim();
        if value.is_empty() {
            return Err(ContractError::EmptyFilterValue {
                key: key.to_string(),
            });
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(ContractError::invalid_filter_value(
                key,
                "control characters are not allowed",
            ));
        }

        self.0.insert(key.to_string(), value.to_lowercase());
        Ok(())
    }

    /// Returns the normalized value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterates over the constraints in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Canonical JSON serialization with keys in lexicographic order.
    pub fn canonical(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl TryFrom<BTreeMap<String, String>> for FilterSet {
    type Error = ContractError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self> {
        Self::from_pairs(map)
    }
}

impl From<FilterSet> for BTreeMap<String, String> {
    fn from(set: FilterSet) -> Self {
        set.0
    }
}
