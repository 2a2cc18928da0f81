// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Parsing helpers shared by the Mt. Gox payload decoders.
//!
//! The wire format mixes string-encoded integers and floats, plain strings, epoch-second
//! numbers and a fixed civil-time layout. The serde helpers below cover the self-describing
//! shapes; [`apply_field_rules`] covers payloads that must be walked key by key.

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};
use thiserror::Error;

use super::consts::SIMPLE_TIME_FORMAT;

/// Deserializes a decimal string (e.g. `"500000000"`) into an `i64`.
///
/// # Errors
///
/// Returns an error if the value is not a string or not a base-10 `i64`.
pub fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<i64>()
        .map_err(|e| de::Error::custom(format!("invalid integer string '{s}': {e}")))
}

/// Deserializes a decimal string (e.g. `"1364689759572564"`) into a `u64`.
///
/// # Errors
///
/// Returns an error if the value is not a string or not a base-10 `u64`.
pub fn deserialize_string_to_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<u64>()
        .map_err(|e| de::Error::custom(format!("invalid integer string '{s}': {e}")))
}

/// Deserializes a float string (e.g. `"42.00000"`) into an `f64`.
///
/// # Errors
///
/// Returns an error if the value is not a string or not a valid float.
pub fn deserialize_string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>()
        .map_err(|e| de::Error::custom(format!("invalid float string '{s}': {e}")))
}

/// Deserializes a header string, treating any non-string value as empty.
///
/// # Errors
///
/// Returns an error only if the input is not valid JSON.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Deserializes a request id echoed either as a JSON string or number.
///
/// # Errors
///
/// Returns an error for any other JSON kind.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number id, found {}",
            json_kind(&other)
        ))),
    }
}

/// Converts epoch seconds to an absolute time, truncating fractional seconds.
#[must_use]
pub fn epoch_secs_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

/// Converts epoch microseconds (the `now` field of ticker and depth pushes) to an absolute time.
#[must_use]
pub fn epoch_micros_to_datetime(micros: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(i64::try_from(micros).ok()?)
}

/// Returns the JSON kind name of `value` for error messages.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Civil timestamp in the fixed `YYYY-MM-DD HH:MM:SS` wire layout (UTC).
///
/// This is distinct from the epoch-number timestamps carried by trades; each message
/// category decodes its own encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimpleTime(pub NaiveDateTime);

impl SimpleTime {
    /// Parses a timestamp in the fixed wire layout.
    ///
    /// # Errors
    ///
    /// Returns [`SimpleTimeError::Layout`] if `s` is not exactly two-digit fields with
    /// literal separators, or [`SimpleTimeError::Invalid`] if the date or time is out of range.
    pub fn parse(s: &str) -> Result<Self, SimpleTimeError> {
        if !has_simple_time_shape(s) {
            return Err(SimpleTimeError::Layout);
        }
        Ok(Self(NaiveDateTime::parse_from_str(s, SIMPLE_TIME_FORMAT)?))
    }

    /// Returns the timestamp as UTC.
    #[must_use]
    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}

/// Error returned by [`SimpleTime::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimpleTimeError {
    #[error("expected layout YYYY-MM-DD HH:MM:SS")]
    Layout,
    #[error(transparent)]
    Invalid(#[from] chrono::ParseError),
}

// chrono accepts single-digit `%m`/`%d`/`%H` fields and lets a space match any whitespace
fn has_simple_time_shape(s: &str) -> bool {
    const LAYOUT: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";

    s.len() == LAYOUT.len()
        && s.bytes().zip(LAYOUT).all(|(b, &expected)| match expected {
            b'd' => b.is_ascii_digit(),
            sep => b == sep,
        })
}

impl Display for SimpleTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(SIMPLE_TIME_FORMAT))
    }
}

impl<'de> Deserialize<'de> for SimpleTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(|e| de::Error::custom(format!("invalid time '{s}': {e}")))
    }
}

impl Serialize for SimpleTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Dynamic kind a field is expected to carry on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string, kept as-is.
    Text,
    /// JSON string holding a base-10 `i64`.
    IntegerText,
    /// JSON number of epoch seconds.
    EpochSeconds,
}

impl FieldKind {
    const fn expected(self) -> &'static str {
        match self {
            Self::Text | Self::IntegerText => "string",
            Self::EpochSeconds => "number",
        }
    }
}

/// A field value after its kind has been checked.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Returns the text, or an empty string for other variants.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(_) | Self::Timestamp(_) => String::new(),
        }
    }

    /// Returns the integer, or zero for other variants.
    #[must_use]
    pub const fn as_integer(&self) -> i64 {
        match self {
            Self::Integer(v) => *v,
            Self::Text(_) | Self::Timestamp(_) => 0,
        }
    }

    /// Returns the timestamp if this is one.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            Self::Text(_) | Self::Integer(_) => None,
        }
    }
}

/// Maps one wire key onto a typed record field.
pub struct FieldRule<T> {
    pub key: &'static str,
    pub kind: FieldKind,
    pub apply: fn(&mut T, FieldValue),
}

impl<T> FieldRule<T> {
    /// Creates a new [`FieldRule`].
    #[must_use]
    pub const fn new(key: &'static str, kind: FieldKind, apply: fn(&mut T, FieldValue)) -> Self {
        Self { key, kind, apply }
    }
}

impl<T> std::fmt::Debug for FieldRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(FieldRule))
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Errors raised while applying a [`FieldRule`] table.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FieldError {
    #[error("field '{key}' expected {expected}, found {found}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field '{key}' value '{value}' is not a base-10 i64: {message}")]
    InvalidInteger {
        key: String,
        value: String,
        message: String,
    },
    #[error("field '{key}' timestamp {value} is out of range")]
    InvalidTimestamp { key: String, value: String },
}

/// Builds a record from an untyped JSON object using an expectation table.
///
/// Keys without a rule are ignored and absent keys keep their default value. A present key
/// whose JSON kind differs from its rule, or whose integer text fails to parse, fails the
/// whole record.
///
/// # Errors
///
/// Returns a [`FieldError`] for the first field that violates its rule.
pub fn apply_field_rules<T: Default>(
    object: &Map<String, Value>,
    rules: &[FieldRule<T>],
) -> Result<T, FieldError> {
    let mut record = T::default();

    for (key, value) in object {
        let Some(rule) = rules.iter().find(|rule| rule.key == key) else {
            continue;
        };
        let field = extract_field(key, rule.kind, value)?;
        (rule.apply)(&mut record, field);
    }

    Ok(record)
}

fn extract_field(key: &str, kind: FieldKind, value: &Value) -> Result<FieldValue, FieldError> {
    match (kind, value) {
        (FieldKind::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (FieldKind::IntegerText, Value::String(s)) => {
            s.parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| FieldError::InvalidInteger {
                    key: key.to_string(),
                    value: s.clone(),
                    message: e.to_string(),
                })
        }
        (FieldKind::EpochSeconds, Value::Number(n)) => n
            .as_f64()
            .and_then(epoch_secs_to_datetime)
            .map(FieldValue::Timestamp)
            .ok_or_else(|| FieldError::InvalidTimestamp {
                key: key.to_string(),
                value: n.to_string(),
            }),
        (kind, other) => Err(FieldError::KindMismatch {
            key: key.to_string(),
            expected: kind.expected(),
            found: json_kind(other),
        }),
    }
}
