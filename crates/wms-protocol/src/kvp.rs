//! Key-value-pair (URL query) plumbing shared by the request codecs.

use std::collections::{BTreeMap, BTreeSet};

use url::form_urlencoded;

use crate::exceptions::OgcException;

/// Canonical (upper case) KVP keys.
pub mod keys {
    pub const SERVICE: &str = "SERVICE";
    pub const REQUEST: &str = "REQUEST";
    pub const VERSION: &str = "VERSION";
    pub const LAYERS: &str = "LAYERS";
    pub const STYLES: &str = "STYLES";
    pub const CRS: &str = "CRS";
    pub const BBOX: &str = "BBOX";
    pub const WIDTH: &str = "WIDTH";
    pub const HEIGHT: &str = "HEIGHT";
    pub const FORMAT: &str = "FORMAT";
    pub const TRANSPARENT: &str = "TRANSPARENT";
    pub const BGCOLOR: &str = "BGCOLOR";
    pub const EXCEPTIONS: &str = "EXCEPTIONS";
    pub const QUERY_LAYERS: &str = "QUERY_LAYERS";
    pub const QUERYLAYERS: &str = "QUERYLAYERS";
    pub const INFO_FORMAT: &str = "INFO_FORMAT";
    pub const FEATURE_COUNT: &str = "FEATURE_COUNT";
    pub const I: &str = "I";
    pub const J: &str = "J";
}

/// Query values as received, keeping key order and repeated values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    pairs: Vec<(String, Vec<String>)>,
}

impl QueryValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Add a value, grouping it with earlier values under the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.pairs.push((key, vec![value.into()])),
        }
    }

    /// Replace all values of a key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value.into()],
            None => self.pairs.push((key, vec![value.into()])),
        }
    }

    /// All values of an exact key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// First value of an exact key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as a query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.pairs {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut values = QueryValues::new();
        for (k, v) in iter {
            values.append(k, v);
        }
        values
    }
}

/// Single-valued parameters keyed by their upper-cased name.
#[derive(Debug, Clone, Default)]
pub(crate) struct KvpParams {
    values: BTreeMap<String, String>,
    /// Keys that were sent but rejected as multi-valued
    rejected: BTreeSet<String>,
}

impl KvpParams {
    /// Normalize raw query values.
    ///
    /// Keys match case-insensitively. A key carrying more than one value is
    /// rejected with InvalidParameterValue and left out of the values, but
    /// remembered so it is not reported as missing as well.
    pub fn from_query(query: &QueryValues) -> (Self, Vec<OgcException>) {
        let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (key, values) in query.iter() {
            grouped
                .entry(key.to_uppercase())
                .or_default()
                .extend(values.iter().map(String::as_str));
        }

        let mut params = KvpParams::default();
        let mut exceptions = Vec::new();
        for (key, values) in grouped {
            match values.as_slice() {
                [value] => {
                    params.values.insert(key, value.to_string());
                }
                _ => {
                    tracing::debug!(key = %key, count = values.len(), "rejecting multi-valued key");
                    exceptions.push(OgcException::invalid_parameter_value(&values.join(","), &key));
                    params.rejected.insert(key);
                }
            }
        }

        (params, exceptions)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The value of a key, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// True when the key was sent with more than one value.
    pub fn is_rejected(&self, key: &str) -> bool {
        self.rejected.contains(key)
    }

    /// A mandatory non-empty value. Absence is reported unless the key was
    /// already rejected.
    pub fn require(&self, key: &str, exceptions: &mut Vec<OgcException>) -> Option<&str> {
        let value = self.get_non_empty(key);
        if value.is_none() && !self.is_rejected(key) {
            exceptions.push(OgcException::missing_parameter(key));
        }
        value
    }
}

/// Split a comma-joined list. An empty value is an empty list, empty tokens
/// inside a non-empty value keep their position.
pub fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}

/// One row of a declared model-to-query mapping.
pub(crate) struct KvpField<T> {
    pub key: &'static str,
    pub value: fn(&T) -> String,
}

/// Project a model onto query values through its field table, in table order.
pub(crate) fn encode_into<T>(query: &mut QueryValues, model: &T, fields: &[KvpField<T>]) {
    for field in fields {
        query.set(field.key, (field.value)(model));
    }
}
