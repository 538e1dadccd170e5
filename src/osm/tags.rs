// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

/// Mapping from OSM tag keys to their (loosely-typed) values.
pub type Tags = HashMap<String, TagValue>;

/// Value of a single OSM tag.
///
/// OSM XML only ever carries text, but JSON sources (e.g. the
/// [Overpass API](https://wiki.openstreetmap.org/wiki/Overpass_API)) are free to
/// encode `maxspeed=50` as a number, `oneway=true` as a boolean, or
/// put something completely unexpected in there.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),

    /// Any other value (null, list or object), kept in its JSON form
    /// for error reporting.
    Other(String),
}

impl TagValue {
    /// Returns the underlying string for [TagValue::Text] values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Checks if the textual representation of this value is equal to `s`.
    ///
    /// Numbers and booleans are compared by their canonical text form,
    /// so `Int(-1)` equals `"-1"` and `Bool(true)` equals `"true"`.
    /// [TagValue::Other] never equals anything.
    pub fn is(&self, s: &str) -> bool {
        match self {
            Self::Text(t) => t == s,
            Self::Int(i) => s.parse::<i64>().is_ok_and(|j| *i == j),
            Self::Float(f) => s.parse::<f64>().is_ok_and(|g| *f == g),
            Self::Bool(b) => s == if *b { "true" } else { "false" },
            Self::Other(_) => false,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for TagValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<serde_json::Value> for TagValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(x) = n.as_f64() {
                    Self::Float(x)
                } else {
                    Self::Other(n.to_string())
                }
            }
            other => Self::Other(other.to_string()),
        }
    }
}

/// Returns the text value of a tag, or `None` if the tag is missing or is not text.
pub(crate) fn get_str<'t>(tags: &'t Tags, key: &str) -> Option<&'t str> {
    tags.get(key).and_then(TagValue::as_str)
}

/// Returns the value of a tag rendered as text, or `default` if the tag is missing.
pub(crate) fn get_text_or(tags: &Tags, key: &str, default: &str) -> String {
    tags.get(key)
        .map(|v| v.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Builds [Tags] from `key: value` pairs; values are anything convertible into a [TagValue].
#[cfg(test)]
macro_rules! tags {
    {} => { $crate::osm::Tags::default() };
    {$( $k:literal : $v:expr ),+ $(,)?} => {
        $crate::osm::Tags::from_iter([
            $( ($k.to_string(), $crate::osm::TagValue::from($v)) ),+
        ])
    };
}

#[cfg(test)]
pub(crate) use tags;
