//! Timezone reconciliation for iCalendar (RFC 5545) data.
//!
//! The crate parses calendars leniently, works out which named timezones are
//! referenced by date-time properties, which ones already carry a `VTIMEZONE`
//! definition, and synthesizes the missing definitions from the IANA database.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

mod descriptor;
mod model;
mod parse;
mod provider;
mod reconcile;
mod serialize;
mod value;

pub use descriptor::{
    DtEnd, DtStamp, DtStart, Due, PropertyDescriptor, RecurrenceId, Summary, TzId, Uid,
};
pub use model::{Calendar, Component, ComponentDraft, ComponentKind, Parameter, Property};
pub use parse::{parse_calendar, parse_calendars};
pub use provider::{ObservanceKind, RuleProvider, TransitionRule, TransitionWindow, TzdbProvider};
pub use reconcile::{
    TimezoneReport, add_missing_timezones, collect_defined_identifiers, collect_used_identifiers,
    lint_timezones, missing_identifiers, timezone_component, timezone_report,
};
pub use value::{DateTimeValue, PropertyInput, TimezoneId, UtcOffset, Value};

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Findings {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub hints: Vec<Finding>,
}

impl Findings {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    /// A property is present but its raw value does not decode as the expected type.
    #[error("invalid {property} value '{value}': {reason}")]
    InvalidContent {
        property: String,
        value: String,
        reason: String,
    },

    /// A setter was handed an input of the wrong kind.
    #[error("{property} expects {expected}, got {found}")]
    TypeMismatch {
        property: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("could not resolve timezone(s): {}", join_ids(.failed))]
    UnresolvedTimezones {
        failed: Vec<TimezoneId>,
        added: Vec<TimezoneId>,
    },

    #[error("UTC must not be defined as a VTIMEZONE; UTC values use the 'Z' suffix")]
    UtcDefinition,

    #[error("invalid ICS input: {0}")]
    InvalidIcs(String),

    #[error(
        "invalid transition window {first}..{last}: years must lie in 1..=9999, \
         first before last, at most 1000 years apart"
    )]
    InvalidWindow { first: i32, last: i32 },
}

fn join_ids(ids: &[TimezoneId]) -> String {
    ids.iter()
        .map(TimezoneId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn canonical_json(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut ordered: BTreeMap<String, serde_json::Value> = BTreeMap::new();
            for (k, v) in map {
                ordered.insert(k.clone(), canonical_json(v));
            }
            let mut out = serde_json::Map::new();
            for (k, v) in ordered {
                out.insert(k, v);
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(values) => {
            serde_json::Value::Array(values.iter().map(canonical_json).collect())
        }
        _ => value.clone(),
    }
}
