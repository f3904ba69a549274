//! Field values and the ordered value map.
//!
//! [`FieldValue`] is a tagged variant; accessors never coerce across
//! variants and return `None` on a mismatch. The serde representation is the
//! draft wire format: plain JSON scalars and arrays, except dates, which
//! travel as `{"type": "datetime", "value": "<ISO-8601>"}` so they decode
//! back into dates instead of strings.

use chrono::{DateTime, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Name → value mapping in declaration order.
pub type ValueMap = IndexMap<String, FieldValue>;

const DATETIME_TAG: &str = "datetime";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single field value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// False for NaN or infinite numbers, including inside lists.
    pub fn is_finite(&self) -> bool {
        match self {
            FieldValue::Number(n) => n.is_finite(),
            FieldValue::List(items) => items.iter().all(FieldValue::is_finite),
            _ => true,
        }
    }

    /// Null, empty text, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short variant name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::List(_) => "list",
        }
    }

    /// Converts to the draft JSON encoding.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(d) => {
                let mut obj = serde_json::Map::new();
                obj.insert("type".to_string(), Value::String(DATETIME_TAG.to_string()));
                obj.insert(
                    "value".to_string(),
                    Value::String(d.format(DATETIME_FORMAT).to_string()),
                );
                Value::Object(obj)
            }
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
        }
    }

    /// Decodes the draft JSON encoding.
    ///
    /// Returns an error message for objects other than the datetime tag and
    /// for unparseable timestamps.
    pub fn from_json(value: &Value) -> Result<FieldValue, String> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .ok_or_else(|| format!("number out of range: {}", n)),
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Array(arr) => arr
                .iter()
                .map(FieldValue::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            Value::Object(map) => {
                let tag = map.get("type").and_then(Value::as_str);
                let raw = map.get("value").and_then(Value::as_str);
                match (tag, raw) {
                    (Some(DATETIME_TAG), Some(raw)) => parse_datetime(raw)
                        .map(FieldValue::Date)
                        .ok_or_else(|| format!("invalid datetime value: '{}'", raw)),
                    _ => Err("objects are only allowed as tagged datetime values".to_string()),
                }
            }
        }
    }
}

/// Accepts the naive ISO-8601 form written by [`FieldValue::to_json`] and
/// offset-carrying RFC 3339 timestamps (converted to UTC).
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.naive_utc()))
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldValue::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(f64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(d: NaiveDateTime) -> Self {
        FieldValue::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
