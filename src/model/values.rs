//! Value types for quirks of the webservice payload.
//!
//! The remote service encodes several things in ways that need a dedicated
//! decoder (comma-joined lists, `0/1` booleans, a localized "featured"
//! marker, space-separated timestamps). Each type here decodes one quirk
//! and knows how to become a single SQLite column value via [`ToColumn`].

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Timestamp format used by the webservice (`2022-03-01 14:05:00`).
pub const WS_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Conversion of a decoded field into one database column value.
pub trait ToColumn {
    fn to_column(&self) -> Value;
}

impl ToColumn for i64 {
    fn to_column(&self) -> Value {
        Value::Integer(*self)
    }
}

impl ToColumn for i32 {
    fn to_column(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToColumn for f64 {
    fn to_column(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToColumn for bool {
    fn to_column(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToColumn for String {
    fn to_column(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl<T: ToColumn> ToColumn for Option<T> {
    fn to_column(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToColumn::to_column)
    }
}

fn json_text<T: Serialize + ?Sized>(value: &T) -> Value {
    // Serializing plain data structs into a string cannot fail.
    serde_json::to_string(value).map_or(Value::Null, Value::Text)
}

// ── Lists ─────────────────────────────────────────────────────

/// A list the service sends as one comma-joined string (`"a, b,c"`).
///
/// Blank strings, `null` and non-string values all decode to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommaList(pub Vec<String>);

impl CommaList {
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CommaList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let items = match raw {
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                s.split(',').map(|part| part.trim().to_string()).collect()
            }
            _ => Vec::new(),
        };
        Ok(Self(items))
    }
}

impl ToColumn for CommaList {
    fn to_column(&self) -> Value {
        json_text(&self.0)
    }
}

/// A list the service sends as a proper JSON string array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TextList(#[serde(deserialize_with = "null_as_default")] pub Vec<String>);

impl ToColumn for TextList {
    fn to_column(&self) -> Value {
        json_text(&self.0)
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Booleans ──────────────────────────────────────────────────

/// Boolean encoded as `0` / `1`. `null` reads as false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntBool(pub bool);

impl<'de> Deserialize<'de> for IntBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => Ok(Self(n.as_i64() == Some(1))),
            serde_json::Value::Bool(b) => Ok(Self(b)),
            serde_json::Value::Null => Ok(Self(false)),
            other => Err(de::Error::custom(format!(
                "expected 0 or 1, found {other}"
            ))),
        }
    }
}

impl ToColumn for IntBool {
    fn to_column(&self) -> Value {
        self.0.to_column()
    }
}

/// The service marks featured listings with the literal string `"Destaque"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeaturedFlag(pub bool);

impl<'de> Deserialize<'de> for FeaturedFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self(raw.as_deref() == Some("Destaque")))
    }
}

impl ToColumn for FeaturedFlag {
    fn to_column(&self) -> Value {
        self.0.to_column()
    }
}

// ── Time ──────────────────────────────────────────────────────

/// Timestamp in the service's `YYYY-MM-DD HH:MM:SS` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WsDateTime(pub NaiveDateTime);

impl<'de> Deserialize<'de> for WsDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, WS_DATETIME_FORMAT)
            .map(Self)
            .map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

impl Serialize for WsDateTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(WS_DATETIME_FORMAT))
    }
}

impl ToColumn for WsDateTime {
    fn to_column(&self) -> Value {
        Value::Text(self.0.format(WS_DATETIME_FORMAT).to_string())
    }
}

// ── Media ─────────────────────────────────────────────────────

/// An image or blueprint. Received as `{link, titulo}`, stored as `{url, title}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename(deserialize = "link"))]
    pub url: String,
    #[serde(rename(deserialize = "titulo"), default)]
    pub title: Option<String>,
}

/// A video link. Received as `{href, title}`, stored as `{url, title}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename(deserialize = "href"))]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A JSON array column (media, videos, calendars).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent, bound(deserialize = "T: Deserialize<'de>"))]
pub struct JsonList<T>(#[serde(deserialize_with = "null_as_default")] pub Vec<T>);

impl<T> Default for JsonList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Serialize> ToColumn for JsonList<T> {
    fn to_column(&self) -> Value {
        json_text(&self.0)
    }
}
