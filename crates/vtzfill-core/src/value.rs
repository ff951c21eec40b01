use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;

const UTC_ID: &str = "UTC";
const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Name of a timezone as it appears in a `TZID` parameter or property.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TimezoneId(String);

impl TimezoneId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `UTC` is spelled with the `Z` suffix on the wire and never gets a definition block.
    pub fn is_utc(&self) -> bool {
        self.0.eq_ignore_ascii_case(UTC_ID)
    }

    /// A `TZID` parameter value may be quoted but cannot itself contain `"`
    /// or control characters.
    pub(crate) fn check_param_safe(&self) -> Result<(), String> {
        if self.0.chars().any(|ch| ch == '"' || ch.is_control()) {
            return Err("timezone identifier cannot contain '\"' or control characters".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for TimezoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TimezoneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimezoneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TimezoneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A DATE or DATE-TIME value in one of the four RFC 5545 shapes.
///
/// Only `Zoned` carries a timezone identifier; `Utc` is written with the
/// `Z` suffix and `Floating` with neither.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeValue {
    Date(NaiveDate),
    Floating(NaiveDateTime),
    Utc(NaiveDateTime),
    Zoned {
        local: NaiveDateTime,
        tzid: TimezoneId,
    },
}

impl DateTimeValue {
    /// Setters reject identifiers that cannot be written as a `TZID` parameter.
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<TimezoneId>) -> Self {
        Self::Zoned {
            local,
            tzid: tzid.into(),
        }
    }

    pub fn tzid(&self) -> Option<&TimezoneId> {
        match self {
            Self::Zoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }

    pub fn is_utc(&self) -> bool {
        matches!(self, Self::Utc(_))
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The wire form has whole-second precision.
    pub(crate) fn has_fractional_seconds(&self) -> bool {
        match self {
            Self::Date(_) => false,
            Self::Floating(time) | Self::Utc(time) | Self::Zoned { local: time, .. } => {
                time.nanosecond() != 0
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "DATE",
            Self::Floating(_) => "floating DATE-TIME",
            Self::Utc(_) => "UTC DATE-TIME",
            Self::Zoned { .. } => "zoned DATE-TIME",
        }
    }

    /// Renders the value part of the content line; `VALUE`/`TZID` parameters are the caller's job.
    pub fn to_wire(&self) -> String {
        match self {
            Self::Date(date) => date.format(DATE_FORMAT).to_string(),
            Self::Floating(local) | Self::Zoned { local, .. } => {
                local.format(DATE_TIME_FORMAT).to_string()
            }
            Self::Utc(utc) => format!("{}Z", utc.format(DATE_TIME_FORMAT)),
        }
    }

    /// Decodes a raw property value given its `VALUE` and `TZID` parameters.
    pub fn from_wire(
        raw: &str,
        value_param: Option<&str>,
        tzid: Option<&str>,
    ) -> Result<Self, String> {
        let raw = raw.trim();
        let wants_date = value_param.is_some_and(|v| v.eq_ignore_ascii_case("DATE"));

        if wants_date || is_date_shape(raw) {
            return parse_date(raw).map(Self::Date);
        }

        if let Some(stripped) = raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
            return parse_date_time(stripped).map(Self::Utc);
        }

        let local = parse_date_time(raw)?;
        match tzid.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Ok(Self::zoned(local, id)),
            None => Ok(Self::Floating(local)),
        }
    }
}

impl From<NaiveDate> for DateTimeValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for DateTimeValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Floating(value)
    }
}

impl From<DateTime<Utc>> for DateTimeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Utc(value.naive_utc())
    }
}

impl From<DateTime<chrono_tz::Tz>> for DateTimeValue {
    fn from(value: DateTime<chrono_tz::Tz>) -> Self {
        let tzid = TimezoneId::from(value.timezone().name());
        if tzid.is_utc() {
            Self::Utc(value.naive_utc())
        } else {
            Self::Zoned {
                local: value.naive_local(),
                tzid,
            }
        }
    }
}

fn is_date_shape(raw: &str) -> bool {
    raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    if !is_date_shape(raw) {
        return Err("expected DATE as YYYYMMDD".to_string());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|err| err.to_string())
}

fn parse_date_time(raw: &str) -> Result<NaiveDateTime, String> {
    let well_formed = raw.len() == 15
        && raw.bytes().enumerate().all(|(i, b)| {
            if i == 8 {
                b.eq_ignore_ascii_case(&b'T')
            } else {
                b.is_ascii_digit()
            }
        });
    if !well_formed {
        return Err("expected DATE-TIME as YYYYMMDDTHHMMSS with optional Z".to_string());
    }
    let normalized = raw.to_ascii_uppercase();
    NaiveDateTime::parse_from_str(&normalized, DATE_TIME_FORMAT).map_err(|err| err.to_string())
}

/// UTC offset in seconds, positive east of Greenwich.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UtcOffset {
    pub seconds: i32,
}

impl UtcOffset {
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    pub fn as_duration(self) -> Duration {
        Duration::seconds(i64::from(self.seconds))
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds >= 0 { '+' } else { '-' };
        let total = self.seconds.abs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if seconds == 0 {
            write!(f, "{sign}{hours:02}{minutes:02}")
        } else {
            write!(f, "{sign}{hours:02}{minutes:02}{seconds:02}")
        }
    }
}

/// Typed payload of a structured setter input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    DateTime(DateTimeValue),
    Text(String),
    Integer(i64),
    Offset(UtcOffset),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DateTime(value) => value.kind_name(),
            Self::Text(_) => "TEXT",
            Self::Integer(_) => "INTEGER",
            Self::Offset(_) => "UTC-OFFSET",
        }
    }
}

/// Everything a property setter can be handed, validated by each descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyInput {
    Text(String),
    Bytes(Vec<u8>),
    Structured(Value),
    /// Removes the property.
    Absent,
}

impl PropertyInput {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "raw text",
            Self::Bytes(_) => "raw bytes",
            Self::Structured(value) => value.kind_name(),
            Self::Absent => "absent value",
        }
    }
}

impl From<&str> for PropertyInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for PropertyInput {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for PropertyInput {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Value> for PropertyInput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<DateTimeValue> for PropertyInput {
    fn from(value: DateTimeValue) -> Self {
        Self::Structured(Value::DateTime(value))
    }
}

impl From<NaiveDate> for PropertyInput {
    fn from(value: NaiveDate) -> Self {
        DateTimeValue::from(value).into()
    }
}

impl From<NaiveDateTime> for PropertyInput {
    fn from(value: NaiveDateTime) -> Self {
        DateTimeValue::from(value).into()
    }
}

impl From<DateTime<Utc>> for PropertyInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateTimeValue::from(value).into()
    }
}

impl From<DateTime<chrono_tz::Tz>> for PropertyInput {
    fn from(value: DateTime<chrono_tz::Tz>) -> Self {
        DateTimeValue::from(value).into()
    }
}

impl From<i64> for PropertyInput {
    fn from(value: i64) -> Self {
        Self::Structured(Value::Integer(value))
    }
}

impl From<UtcOffset> for PropertyInput {
    fn from(value: UtcOffset) -> Self {
        Self::Structured(Value::Offset(value))
    }
}

impl<T: Into<PropertyInput>> From<Option<T>> for PropertyInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

pub(crate) fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

pub(crate) fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
