//! Bound parameters, before and after expansion
//!
//! A caller hands the expander a [`ParamSet`]: either an ordered list of
//! values (positional binding, `?`) or a keyed map (named binding, `:name`).
//! Each entry is a [`ParamValue`], which is either one scalar or a sequence of
//! scalars meant to fill a bracketed placeholder such as `[?]` or `[:ids]`.
//!
//! Expansion produces [`FlatParams`], where every entry is a single [`Value`]
//! in the shape a driver binds directly.

use indexmap::IndexMap;

use crate::Value;

/// A value bound to one placeholder occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Passed through to the driver untouched.
    Scalar(Value),
    /// Expanded into one placeholder per element by a bracketed token.
    Sequence(Vec<Value>),
}

impl ParamValue {
    /// Build a sequence from anything convertible into values.
    pub fn sequence<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        ParamValue::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ParamValue::Sequence(_))
    }

    /// Convert into a single bindable value.
    ///
    /// A sequence becomes `Value::Array`; whether that can be bound is up to
    /// the driver.
    pub fn into_value(self) -> Value {
        match self {
            ParamValue::Scalar(value) => value,
            ParamValue::Sequence(items) => Value::Array(items),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ParamValue::Sequence(items),
            other => ParamValue::Scalar(other),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::sequence(items)
    }
}

macro_rules! scalar_param_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(v: $ty) -> Self {
                    ParamValue::Scalar(Value::from(v))
                }
            }
        )*
    };
}

scalar_param_from!(i32, i64, f64, bool, &str, String);

/// Key of a raw parameter entry, before the binding mode is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Index(usize),
    Name(String),
}

impl ParamKey {
    /// Parse a textual key; canonical decimal numbers become indices.
    ///
    /// `"0"` and `"12"` are indices, `"012"`, `"-1"` and `"ids"` are names.
    pub fn parse(key: &str) -> Self {
        let canonical = !key.is_empty()
            && key.bytes().all(|b| b.is_ascii_digit())
            && (key == "0" || !key.starts_with('0'));
        match key.parse::<usize>() {
            Ok(index) if canonical => ParamKey::Index(index),
            _ => ParamKey::Name(key.to_string()),
        }
    }

    fn into_name(self) -> String {
        match self {
            ParamKey::Index(index) => index.to_string(),
            ParamKey::Name(name) => match name.strip_prefix(':') {
                Some(stripped) => stripped.to_string(),
                None => name,
            },
        }
    }
}

impl From<usize> for ParamKey {
    fn from(index: usize) -> Self {
        ParamKey::Index(index)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

/// How placeholders are matched to values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    /// `?` placeholders, bound by left-to-right order.
    Positional,
    /// `:name` placeholders, bound by key.
    Named,
}

impl ParamMode {
    /// Positional iff the keys are exactly `0, 1, .., n-1` in that order.
    ///
    /// An empty key list is positional.
    pub fn select<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a ParamKey>,
    {
        let dense = keys
            .into_iter()
            .enumerate()
            .all(|(expected, key)| matches!(key, ParamKey::Index(index) if *index == expected));
        if dense {
            ParamMode::Positional
        } else {
            ParamMode::Named
        }
    }
}

/// Parameters as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSet {
    Positional(Vec<ParamValue>),
    /// Keys are stored without the leading `:`.
    Named(IndexMap<String, ParamValue>),
}

impl Default for ParamSet {
    fn default() -> Self {
        ParamSet::Positional(Vec::new())
    }
}

impl ParamSet {
    pub fn positional(values: Vec<ParamValue>) -> Self {
        ParamSet::Positional(values)
    }

    /// Build a named set; a leading `:` on a key is dropped.
    pub fn named<K: Into<String>>(entries: Vec<(K, ParamValue)>) -> Self {
        ParamSet::Named(
            entries
                .into_iter()
                .map(|(key, value)| (ParamKey::Name(key.into()).into_name(), value))
                .collect(),
        )
    }

    /// Build a set from keyed entries, selecting the mode from the keys.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ParamKey, ParamValue)>,
    {
        let entries: Vec<(ParamKey, ParamValue)> = entries.into_iter().collect();
        match ParamMode::select(entries.iter().map(|(key, _)| key)) {
            ParamMode::Positional => {
                ParamSet::Positional(entries.into_iter().map(|(_, value)| value).collect())
            }
            ParamMode::Named => ParamSet::Named(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into_name(), value))
                    .collect(),
            ),
        }
    }

    pub fn mode(&self) -> ParamMode {
        match self {
            ParamSet::Positional(_) => ParamMode::Positional,
            ParamSet::Named(_) => ParamMode::Named,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ParamSet::Positional(values) => values.len(),
            ParamSet::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten without expanding anything.
    pub fn into_flat(self) -> FlatParams {
        match self {
            ParamSet::Positional(values) => {
                FlatParams::Positional(values.into_iter().map(ParamValue::into_value).collect())
            }
            ParamSet::Named(map) => FlatParams::Named(
                map.into_iter()
                    .map(|(key, value)| (key, value.into_value()))
                    .collect(),
            ),
        }
    }
}

/// Parameters after expansion, one value per placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatParams {
    /// In final left-to-right placeholder order.
    Positional(Vec<Value>),
    /// Keyed without the leading `:`.
    Named(IndexMap<String, Value>),
}

impl Default for FlatParams {
    fn default() -> Self {
        FlatParams::Positional(Vec::new())
    }
}

impl FlatParams {
    pub fn len(&self) -> usize {
        match self {
            FlatParams::Positional(values) => values.len(),
            FlatParams::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_positional(&self) -> Option<&[Value]> {
        match self {
            FlatParams::Positional(values) => Some(values),
            FlatParams::Named(_) => None,
        }
    }

    pub fn as_named(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            FlatParams::Positional(_) => None,
            FlatParams::Named(map) => Some(map),
        }
    }
}
