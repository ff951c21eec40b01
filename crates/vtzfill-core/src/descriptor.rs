//! Typed accessors layered over the raw property bag.
//!
//! Each well-known property gets one descriptor type implementing
//! [`PropertyDescriptor`]; `get`, `set` and `delete` are written once on the
//! trait and work against any [`Component`].

use crate::CoreError;
use crate::model::{Component, Property};
use crate::value::{
    DateTimeValue, PropertyInput, TimezoneId, Value, escape_text, unescape_text,
};

pub trait PropertyDescriptor {
    const NAME: &'static str;
    type Value;

    /// Interprets the raw property, failing with [`CoreError::InvalidContent`].
    fn decode(property: &Property) -> Result<Self::Value, CoreError>;

    /// Validates a setter input; `Ok(None)` means the property should be removed.
    fn accept(input: PropertyInput) -> Result<Option<Self::Value>, CoreError>;

    fn encode(value: &Self::Value) -> Property;

    fn get(component: &Component) -> Result<Option<Self::Value>, CoreError> {
        component.property(Self::NAME).map(Self::decode).transpose()
    }

    fn set(component: &mut Component, input: impl Into<PropertyInput>) -> Result<(), CoreError> {
        match Self::accept(input.into())? {
            Some(value) => component.replace_property(Self::encode(&value)),
            None => Self::delete(component),
        }
        Ok(())
    }

    fn delete(component: &mut Component) {
        component.remove_property(Self::NAME);
    }
}

pub struct RecurrenceId;
pub struct DtStart;
pub struct DtEnd;
pub struct Due;
/// `DTSTAMP`, which RFC 5545 requires to be UTC.
pub struct DtStamp;
pub struct Summary;
pub struct Uid;
/// The `TZID` property of a `VTIMEZONE` block.
pub struct TzId;

impl PropertyDescriptor for RecurrenceId {
    const NAME: &'static str = "RECURRENCE-ID";
    type Value = DateTimeValue;

    fn decode(property: &Property) -> Result<DateTimeValue, CoreError> {
        decode_date_time(property)
    }

    fn accept(input: PropertyInput) -> Result<Option<DateTimeValue>, CoreError> {
        accept_date_time(Self::NAME, input)
    }

    fn encode(value: &DateTimeValue) -> Property {
        encode_date_time(Self::NAME, value)
    }
}

impl PropertyDescriptor for DtStart {
    const NAME: &'static str = "DTSTART";
    type Value = DateTimeValue;

    fn decode(property: &Property) -> Result<DateTimeValue, CoreError> {
        decode_date_time(property)
    }

    fn accept(input: PropertyInput) -> Result<Option<DateTimeValue>, CoreError> {
        accept_date_time(Self::NAME, input)
    }

    fn encode(value: &DateTimeValue) -> Property {
        encode_date_time(Self::NAME, value)
    }
}

impl PropertyDescriptor for DtEnd {
    const NAME: &'static str = "DTEND";
    type Value = DateTimeValue;

    fn decode(property: &Property) -> Result<DateTimeValue, CoreError> {
        decode_date_time(property)
    }

    fn accept(input: PropertyInput) -> Result<Option<DateTimeValue>, CoreError> {
        accept_date_time(Self::NAME, input)
    }

    fn encode(value: &DateTimeValue) -> Property {
        encode_date_time(Self::NAME, value)
    }
}

impl PropertyDescriptor for Due {
    const NAME: &'static str = "DUE";
    type Value = DateTimeValue;

    fn decode(property: &Property) -> Result<DateTimeValue, CoreError> {
        decode_date_time(property)
    }

    fn accept(input: PropertyInput) -> Result<Option<DateTimeValue>, CoreError> {
        accept_date_time(Self::NAME, input)
    }

    fn encode(value: &DateTimeValue) -> Property {
        encode_date_time(Self::NAME, value)
    }
}

impl PropertyDescriptor for DtStamp {
    const NAME: &'static str = "DTSTAMP";
    type Value = DateTimeValue;

    fn decode(property: &Property) -> Result<DateTimeValue, CoreError> {
        decode_date_time(property)
    }

    fn accept(input: PropertyInput) -> Result<Option<DateTimeValue>, CoreError> {
        match accept_date_time(Self::NAME, input)? {
            Some(value) if !value.is_utc() => Err(CoreError::TypeMismatch {
                property: Self::NAME,
                expected: "UTC DATE-TIME",
                found: value.kind_name(),
            }),
            other => Ok(other),
        }
    }

    fn encode(value: &DateTimeValue) -> Property {
        encode_date_time(Self::NAME, value)
    }
}

impl PropertyDescriptor for Summary {
    const NAME: &'static str = "SUMMARY";
    type Value = String;

    fn decode(property: &Property) -> Result<String, CoreError> {
        Ok(unescape_text(&property.value))
    }

    fn accept(input: PropertyInput) -> Result<Option<String>, CoreError> {
        accept_text(Self::NAME, input)
    }

    fn encode(value: &String) -> Property {
        Property::new(Self::NAME, escape_text(value))
    }
}

impl PropertyDescriptor for Uid {
    const NAME: &'static str = "UID";
    type Value = String;

    fn decode(property: &Property) -> Result<String, CoreError> {
        Ok(unescape_text(&property.value))
    }

    fn accept(input: PropertyInput) -> Result<Option<String>, CoreError> {
        accept_text(Self::NAME, input)
    }

    fn encode(value: &String) -> Property {
        Property::new(Self::NAME, escape_text(value))
    }
}

impl PropertyDescriptor for TzId {
    const NAME: &'static str = "TZID";
    type Value = TimezoneId;

    fn decode(property: &Property) -> Result<TimezoneId, CoreError> {
        let id = unescape_text(property.value.trim());
        if id.is_empty() {
            return Err(CoreError::InvalidContent {
                property: property.name.clone(),
                value: property.value.clone(),
                reason: "timezone identifier is empty".to_string(),
            });
        }
        Ok(TimezoneId::new(id))
    }

    fn accept(input: PropertyInput) -> Result<Option<TimezoneId>, CoreError> {
        match accept_text(Self::NAME, input)? {
            Some(id) if id.trim().is_empty() => Err(CoreError::TypeMismatch {
                property: Self::NAME,
                expected: "non-empty TEXT",
                found: "empty text",
            }),
            Some(id) => {
                let id = TimezoneId::new(id);
                check_tzid(Self::NAME, &id)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    fn encode(value: &TimezoneId) -> Property {
        Property::new(Self::NAME, escape_text(value.as_str()))
    }
}

fn decode_date_time(property: &Property) -> Result<DateTimeValue, CoreError> {
    DateTimeValue::from_wire(
        &property.value,
        property.param("VALUE"),
        property.param("TZID"),
    )
    .map_err(|reason| CoreError::InvalidContent {
        property: property.name.clone(),
        value: property.value.clone(),
        reason,
    })
}

fn accept_date_time(
    name: &'static str,
    input: PropertyInput,
) -> Result<Option<DateTimeValue>, CoreError> {
    match input {
        PropertyInput::Structured(Value::DateTime(value)) => {
            if value.has_fractional_seconds() {
                return Err(CoreError::TypeMismatch {
                    property: name,
                    expected: "DATE or DATE-TIME",
                    found: "DATE-TIME with fractional seconds",
                });
            }
            if let Some(tzid) = value.tzid() {
                check_tzid(name, tzid)?;
            }
            Ok(Some(value))
        }
        PropertyInput::Absent => Ok(None),
        other => Err(CoreError::TypeMismatch {
            property: name,
            expected: "DATE or DATE-TIME",
            found: other.kind_name(),
        }),
    }
}

fn check_tzid(name: &str, tzid: &TimezoneId) -> Result<(), CoreError> {
    tzid.check_param_safe()
        .map_err(|reason| CoreError::InvalidContent {
            property: name.to_string(),
            value: tzid.to_string(),
            reason,
        })
}

fn encode_date_time(name: &'static str, value: &DateTimeValue) -> Property {
    let property = Property::new(name, value.to_wire());
    match value {
        DateTimeValue::Date(_) => property.with_param("VALUE", "DATE"),
        DateTimeValue::Zoned { tzid, .. } => property.with_param("TZID", tzid.as_str()),
        DateTimeValue::Floating(_) | DateTimeValue::Utc(_) => property,
    }
}

fn accept_text(name: &'static str, input: PropertyInput) -> Result<Option<String>, CoreError> {
    match input {
        PropertyInput::Text(text) | PropertyInput::Structured(Value::Text(text)) => Ok(Some(text)),
        PropertyInput::Absent => Ok(None),
        other => Err(CoreError::TypeMismatch {
            property: name,
            expected: "TEXT",
            found: other.kind_name(),
        }),
    }
}

impl Component {
    pub fn recurrence_id(&self) -> Result<Option<DateTimeValue>, CoreError> {
        RecurrenceId::get(self)
    }

    pub fn set_recurrence_id(&mut self, input: impl Into<PropertyInput>) -> Result<(), CoreError> {
        RecurrenceId::set(self, input)
    }

    pub fn delete_recurrence_id(&mut self) {
        RecurrenceId::delete(self);
    }

    /// Identifier declared by a `VTIMEZONE` block, if it has a usable one.
    pub fn tz_name(&self) -> Option<TimezoneId> {
        TzId::get(self).ok().flatten()
    }
}
