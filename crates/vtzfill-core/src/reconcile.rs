//! Which timezones a calendar references, which it defines, and filling the gap.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::descriptor::{PropertyDescriptor, RecurrenceId, TzId};
use crate::model::{Calendar, Component, ComponentKind, Property};
use crate::provider::{ObservanceKind, RuleProvider, TransitionRule, TzdbProvider};
use crate::value::{DateTimeValue, TimezoneId};
use crate::{CoreError, Finding, Findings};

/// IANA names whose offset is always zero; they are valid zones, unlike `UTC`.
const UTC_ALIASES: &[&str] = &[
    "Etc/UTC",
    "Etc/UCT",
    "Etc/Universal",
    "Etc/Zulu",
    "Etc/GMT",
    "Etc/GMT0",
    "Etc/GMT+0",
    "Etc/GMT-0",
    "Etc/Greenwich",
    "UCT",
    "Universal",
    "Zulu",
    "GMT",
    "GMT0",
    "GMT+0",
    "GMT-0",
    "Greenwich",
];

#[derive(Debug, Clone, Serialize)]
pub struct TimezoneReport {
    pub used: BTreeSet<TimezoneId>,
    pub defined: BTreeSet<TimezoneId>,
    pub missing: BTreeSet<TimezoneId>,
}

/// Every `TZID` referenced by a zoned date-time outside `VTIMEZONE` blocks.
///
/// UTC and DATE values contribute nothing. A legacy `TZID=UTC` on a local time is
/// collected as-is and filtered later by [`missing_identifiers`].
pub fn collect_used_identifiers(calendar: &Calendar) -> BTreeSet<TimezoneId> {
    let mut used: BTreeSet<TimezoneId> = calendar
        .properties
        .iter()
        .filter_map(zoned_reference)
        .collect();

    for_each_component(&calendar.components, &mut |component| {
        used.extend(component.properties.iter().filter_map(zoned_reference));
    });

    used
}

/// Identifiers declared by the calendar's top-level `VTIMEZONE` blocks.
pub fn collect_defined_identifiers(calendar: &Calendar) -> BTreeSet<TimezoneId> {
    calendar.timezones().filter_map(Component::tz_name).collect()
}

/// Referenced minus defined minus UTC.
pub fn missing_identifiers(calendar: &Calendar) -> BTreeSet<TimezoneId> {
    let defined = collect_defined_identifiers(calendar);
    collect_used_identifiers(calendar)
        .difference(&defined)
        .filter(|tzid| !tzid.is_utc())
        .cloned()
        .collect()
}

pub fn timezone_report(calendar: &Calendar) -> TimezoneReport {
    TimezoneReport {
        used: collect_used_identifiers(calendar),
        defined: collect_defined_identifiers(calendar),
        missing: missing_identifiers(calendar),
    }
}

/// Synthesizes a `VTIMEZONE` for every missing identifier and returns the ones added.
///
/// Each block is built completely before it is inserted, so a failing zone
/// leaves no trace. Failures are collected and reported together once every
/// identifier has been attempted; blocks that succeeded stay in the calendar.
pub fn add_missing_timezones(
    calendar: &mut Calendar,
    provider: &impl RuleProvider,
) -> Result<Vec<TimezoneId>, CoreError> {
    let mut added = Vec::new();
    let mut failed = Vec::new();

    for tzid in missing_identifiers(calendar) {
        match timezone_component(&tzid, provider) {
            Ok(block) => {
                debug!(tzid = %tzid, observances = block.components.len(), "adding VTIMEZONE");
                insert_timezone(calendar, block);
                added.push(tzid);
            }
            Err(err) => {
                warn!(tzid = %tzid, error = %err, "cannot synthesize VTIMEZONE");
                failed.push(tzid);
            }
        }
    }

    if failed.is_empty() {
        Ok(added)
    } else {
        Err(CoreError::UnresolvedTimezones { failed, added })
    }
}

/// Builds a standalone `VTIMEZONE` block from the provider's transition rules.
pub fn timezone_component(
    tzid: &TimezoneId,
    provider: &impl RuleProvider,
) -> Result<Component, CoreError> {
    if tzid.is_utc() {
        return Err(CoreError::UtcDefinition);
    }

    let rules = provider.resolve(tzid)?;
    if rules.is_empty() {
        return Err(CoreError::UnknownTimezone(tzid.to_string()));
    }

    let mut block = Component::new(ComponentKind::Timezone);
    block.push_property(TzId::encode(tzid));
    for group in group_rules(&rules) {
        block.push_component(observance(&group));
    }
    Ok(block)
}

impl Calendar {
    pub fn missing_timezone_ids(&self) -> BTreeSet<TimezoneId> {
        missing_identifiers(self)
    }

    /// [`add_missing_timezones`] backed by the bundled IANA database and the default window.
    pub fn add_missing_timezones(&mut self) -> Result<Vec<TimezoneId>, CoreError> {
        add_missing_timezones(self, &TzdbProvider::default())
    }
}

impl Component {
    pub fn timezone_from_tzid(tzid: &str) -> Result<Self, CoreError> {
        timezone_component(&TimezoneId::from(tzid), &TzdbProvider::default())
    }
}

/// Timezone findings that do not stop processing.
pub fn lint_timezones(calendar: &Calendar) -> Findings {
    let mut out = Findings::default();
    let used = collect_used_identifiers(calendar);

    let mut definitions: BTreeMap<TimezoneId, usize> = BTreeMap::new();
    for block in calendar.timezones() {
        match block.tz_name() {
            Some(tzid) => *definitions.entry(tzid).or_default() += 1,
            None => out.warnings.push(Finding {
                code: "W003".to_string(),
                message: "VTIMEZONE without TZID".to_string(),
                details: Some("The block cannot be matched to any TZID parameter.".to_string()),
            }),
        }
    }

    for (tzid, count) in &definitions {
        if *count > 1 {
            out.errors.push(Finding {
                code: "E002".to_string(),
                message: "Duplicate VTIMEZONE definitions".to_string(),
                details: Some(format!("{tzid} is defined {count} times.")),
            });
        }
        if tzid.is_utc() {
            out.errors.push(Finding {
                code: "E003".to_string(),
                message: "VTIMEZONE defined for UTC".to_string(),
                details: Some("UTC values use the 'Z' suffix and need no VTIMEZONE.".to_string()),
            });
        } else if !used.contains(tzid) {
            out.warnings.push(Finding {
                code: "W001".to_string(),
                message: "Unreferenced VTIMEZONE".to_string(),
                details: Some(format!("No property uses TZID={tzid}.")),
            });
        }
    }

    for tzid in missing_identifiers(calendar) {
        out.errors.push(Finding {
            code: "E001".to_string(),
            message: "Missing VTIMEZONE for referenced TZID".to_string(),
            details: Some(format!("TZID={tzid} has no VTIMEZONE block.")),
        });
    }

    for_each_component(&calendar.components, &mut |component| {
        for property in &component.properties {
            let Some(tzid) = property.param("TZID") else {
                continue;
            };
            if is_date_value(property) {
                out.warnings.push(Finding {
                    code: "W004".to_string(),
                    message: "TZID parameter on a DATE value".to_string(),
                    details: Some(format!(
                        "{} carries TZID={tzid}; DATE values have no timezone.",
                        property.name
                    )),
                });
            } else if is_utc_value(&property.value) || TimezoneId::from(tzid.trim()).is_utc() {
                out.warnings.push(Finding {
                    code: "W002".to_string(),
                    message: "TZID parameter on a UTC value".to_string(),
                    details: Some(format!(
                        "{} carries TZID={tzid}; UTC values use the 'Z' suffix instead.",
                        property.name
                    )),
                });
            } else if UTC_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(tzid.trim())) {
                out.hints.push(Finding {
                    code: "H001".to_string(),
                    message: "TZID names a zero-offset zone".to_string(),
                    details: Some(format!(
                        "{} uses TZID={tzid}; a UTC value with the 'Z' suffix needs no VTIMEZONE.",
                        property.name
                    )),
                });
            }
        }

        if let Err(err) = RecurrenceId::get(component) {
            out.errors.push(Finding {
                code: "E004".to_string(),
                message: "Invalid RECURRENCE-ID value".to_string(),
                details: Some(err.to_string()),
            });
        }
    });

    out
}

/// Visits components depth-first, skipping `VTIMEZONE` subtrees whose
/// observance `DTSTART`s are local times without a `TZID`.
fn for_each_component<'a>(components: &'a [Component], visit: &mut impl FnMut(&'a Component)) {
    for component in components {
        if component.kind == ComponentKind::Timezone {
            continue;
        }
        visit(component);
        for_each_component(&component.components, visit);
    }
}

fn zoned_reference(property: &Property) -> Option<TimezoneId> {
    let tzid = property.param("TZID")?.trim();
    if tzid.is_empty() || is_date_value(property) || is_utc_value(&property.value) {
        return None;
    }
    Some(TimezoneId::from(tzid))
}

/// `VALUE=DATE`, or a value list made only of `YYYYMMDD` dates.
fn is_date_value(property: &Property) -> bool {
    if property
        .param("VALUE")
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("DATE"))
    {
        return true;
    }
    let mut parts = value_parts(&property.value).peekable();
    parts.peek().is_some()
        && parts.all(|part| part.len() == 8 && part.bytes().all(|b| b.is_ascii_digit()))
}

/// True when every listed value (the start of a PERIOD included) carries the `Z` suffix.
fn is_utc_value(raw: &str) -> bool {
    let mut parts = value_parts(raw).peekable();
    parts.peek().is_some() && parts.all(|part| part.ends_with(['Z', 'z']))
}

fn value_parts(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',')
        .map(|part| part.split('/').next().unwrap_or(part).trim())
        .filter(|part| !part.is_empty())
}

fn insert_timezone(calendar: &mut Calendar, block: Component) {
    let position = calendar
        .components
        .iter()
        .rposition(|c| c.kind == ComponentKind::Timezone)
        .map_or(0, |index| index + 1);
    calendar.components.insert(position, block);
}

fn group_rules(rules: &[TransitionRule]) -> Vec<Vec<&TransitionRule>> {
    let mut groups: Vec<Vec<&TransitionRule>> = Vec::new();
    for rule in rules {
        let existing = groups.iter_mut().find(|group| {
            let first = group[0];
            first.kind == rule.kind
                && first.offset_from == rule.offset_from
                && first.offset_to == rule.offset_to
                && first.name == rule.name
        });
        match existing {
            Some(group) => group.push(rule),
            None => groups.push(vec![rule]),
        }
    }
    groups
}

fn observance(group: &[&TransitionRule]) -> Component {
    let first = group[0];
    let kind = match first.kind {
        ObservanceKind::Standard => ComponentKind::Standard,
        ObservanceKind::Daylight => ComponentKind::Daylight,
    };

    let mut component = Component::new(kind);
    component.push_property(Property::new(
        "DTSTART",
        DateTimeValue::Floating(first.start).to_wire(),
    ));
    component.push_property(Property::new("TZOFFSETFROM", first.offset_from.to_string()));
    component.push_property(Property::new("TZOFFSETTO", first.offset_to.to_string()));
    if let Some(name) = &first.name {
        component.push_property(Property::new("TZNAME", name.clone()));
    }
    for rule in &group[1..] {
        component.push_property(Property::new(
            "RDATE",
            DateTimeValue::Floating(rule.start).to_wire(),
        ));
    }
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DtStart;
    use crate::model::ComponentDraft;
    use crate::parse::parse_calendar;
    use crate::provider::TransitionWindow;
    use crate::value::UtcOffset;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn ids(values: &[&str]) -> BTreeSet<TimezoneId> {
        values.iter().map(|v| TimezoneId::from(*v)).collect()
    }

    fn zurich_event() -> Component {
        Component::event(ComponentDraft {
            summary: Some("Meeting in Zurich".to_string()),
            start: Some(
                chrono_tz::Europe::Zurich
                    .with_ymd_and_hms(2022, 1, 1, 12, 0, 0)
                    .unwrap()
                    .into(),
            ),
            end: Some(
                chrono_tz::Europe::Zurich
                    .with_ymd_and_hms(2022, 1, 1, 13, 0, 0)
                    .unwrap()
                    .into(),
            ),
            ..ComponentDraft::default()
        })
    }

    struct FixedProvider;

    impl RuleProvider for FixedProvider {
        fn resolve(&self, tzid: &TimezoneId) -> Result<Vec<TransitionRule>, CoreError> {
            if tzid.as_str() != "Test/Fixed" {
                return Err(CoreError::UnknownTimezone(tzid.to_string()));
            }
            Ok(vec![TransitionRule {
                kind: ObservanceKind::Standard,
                offset_from: UtcOffset::from_seconds(3600),
                offset_to: UtcOffset::from_seconds(3600),
                name: None,
                start: at(1970, 1, 1, 1),
            }])
        }
    }

    #[test]
    fn utc_only_calendar_needs_nothing() {
        let mut event = Component::new(ComponentKind::Event);
        event.push_property(Property::new("DTSTART", "20220101T120000Z"));
        event.push_property(Property::new("DTEND", "20220101T130000Z"));
        let calendar = Calendar::new(vec![event]);

        assert!(collect_used_identifiers(&calendar).is_empty());
        assert!(collect_defined_identifiers(&calendar).is_empty());
        assert!(missing_identifiers(&calendar).is_empty());
    }

    #[test]
    fn legacy_utc_tzid_never_becomes_missing() {
        let mut event = Component::new(ComponentKind::Event);
        event.push_property(Property::new("DTSTART", "20220101T120000").with_param("TZID", "UTC"));
        let calendar = Calendar::new(vec![event]);

        assert_eq!(collect_used_identifiers(&calendar), ids(&["UTC"]));
        assert!(missing_identifiers(&calendar).is_empty());
    }

    #[test]
    fn stray_tzid_on_z_value_is_not_a_reference() {
        let mut event = Component::new(ComponentKind::Event);
        event.push_property(
            Property::new("DTSTART", "20220101T120000Z").with_param("TZID", "Europe/Zurich"),
        );
        let calendar = Calendar::new(vec![event]);
        assert!(collect_used_identifiers(&calendar).is_empty());
    }

    #[test]
    fn tzid_on_a_date_value_is_not_a_reference() {
        let mut event = Component::new(ComponentKind::Event);
        event.push_property(
            Property::new("DTSTART", "20220101")
                .with_param("VALUE", "DATE")
                .with_param("TZID", "Europe/Zurich"),
        );
        event.push_property(Property::new("EXDATE", "20220108,20220115").with_param("TZID", "Asia/Tokyo"));
        let calendar = Calendar::new(vec![event]);

        let decoded = DtStart::get(&calendar.components[0]).expect("decode");
        assert_eq!(
            decoded,
            Some(DateTimeValue::Date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()))
        );
        assert!(collect_used_identifiers(&calendar).is_empty());
        assert!(missing_identifiers(&calendar).is_empty());

        let warnings: Vec<_> = lint_timezones(&calendar)
            .warnings
            .iter()
            .map(|f| f.code.clone())
            .collect();
        assert_eq!(warnings, ["W004", "W004"]);
    }

    #[test]
    fn zurich_meeting_gets_exactly_one_block() {
        let mut calendar = Calendar::new(vec![zurich_event()]);
        assert_eq!(missing_identifiers(&calendar), ids(&["Europe/Zurich"]));

        let added = calendar.add_missing_timezones().expect("synthesize");
        assert_eq!(added, vec![TimezoneId::from("Europe/Zurich")]);

        let names: Vec<_> = calendar.timezones().filter_map(Component::tz_name).collect();
        assert_eq!(names, vec![TimezoneId::from("Europe/Zurich")]);
        assert!(!names.iter().any(TimezoneId::is_utc));
        assert!(missing_identifiers(&calendar).is_empty());
        assert_eq!(calendar.components[0].kind, ComponentKind::Timezone);
    }

    #[test]
    fn second_call_is_a_no_op() {
        let mut calendar = Calendar::new(vec![zurich_event()]);
        calendar.add_missing_timezones().expect("first");
        let snapshot = calendar.clone();

        let added = calendar.add_missing_timezones().expect("second");
        assert!(added.is_empty());
        assert_eq!(calendar, snapshot);
    }

    #[test]
    fn unreferenced_block_is_not_missing() {
        let block = Component::timezone_from_tzid("America/New_York").expect("block");
        let calendar = Calendar::new(vec![block]);

        assert_eq!(collect_defined_identifiers(&calendar), ids(&["America/New_York"]));
        assert!(missing_identifiers(&calendar).is_empty());
    }

    #[test]
    fn empty_calendar_has_no_deficit() {
        let calendar = Calendar::default();
        assert!(missing_identifiers(&calendar).is_empty());
    }

    #[test]
    fn collects_from_nested_and_multi_valued_properties() {
        let raw = "BEGIN:VCALENDAR\n\
                   BEGIN:VTIMEZONE\nTZID:Europe/Berlin\nBEGIN:STANDARD\nDTSTART:19701025T030000\nTZOFFSETFROM:+0200\nTZOFFSETTO:+0100\nEND:STANDARD\nEND:VTIMEZONE\n\
                   BEGIN:VEVENT\nDTSTART;TZID=Europe/Berlin:20260301T100000\n\
                   EXDATE;TZID=America/Chicago:20260308T100000,20260315T100000\n\
                   RDATE;VALUE=PERIOD:20260320T090000Z/PT1H\n\
                   BEGIN:VALARM\nTRIGGER;VALUE=DATE-TIME;TZID=Asia/Tokyo:20260301T080000\nEND:VALARM\n\
                   END:VEVENT\n\
                   BEGIN:VTODO\nDUE;TZID=Europe/Zurich:\nEND:VTODO\n\
                   END:VCALENDAR\n";
        let calendar = parse_calendar(raw).expect("parse");

        assert_eq!(
            collect_used_identifiers(&calendar),
            ids(&["America/Chicago", "Asia/Tokyo", "Europe/Berlin", "Europe/Zurich"])
        );
        assert_eq!(
            missing_identifiers(&calendar),
            ids(&["America/Chicago", "Asia/Tokyo", "Europe/Zurich"])
        );
    }

    #[test]
    fn failures_are_batched_and_successes_kept() {
        let mut calendar = Calendar::new(Vec::new());
        for tzid in ["Test/Fixed", "Mars/Olympus", "Moon/Base"] {
            let mut event = Component::new(ComponentKind::Event);
            event.push_property(Property::new("DTSTART", "20220101T120000").with_param("TZID", tzid));
            calendar.add_component(event);
        }

        let err = add_missing_timezones(&mut calendar, &FixedProvider).unwrap_err();
        match err {
            CoreError::UnresolvedTimezones { failed, added } => {
                assert_eq!(failed, vec![TimezoneId::from("Mars/Olympus"), TimezoneId::from("Moon/Base")]);
                assert_eq!(added, vec![TimezoneId::from("Test/Fixed")]);
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert_eq!(calendar.timezones().count(), 1);
        assert_eq!(missing_identifiers(&calendar), ids(&["Mars/Olympus", "Moon/Base"]));
    }

    #[test]
    fn new_blocks_follow_existing_ones() {
        let existing = timezone_component(&TimezoneId::from("Test/Fixed"), &FixedProvider).unwrap();
        let mut event = Component::new(ComponentKind::Event);
        event.push_property(Property::new("DTSTART", "20220101T120000").with_param("TZID", "Asia/Tokyo"));
        let mut calendar = Calendar::new(vec![existing, event]);

        calendar.add_missing_timezones().expect("tokyo");
        let kinds: Vec<_> = calendar.components.iter().map(|c| c.kind.clone()).collect();
        assert_eq!(kinds, [ComponentKind::Timezone, ComponentKind::Timezone, ComponentKind::Event]);
        assert_eq!(calendar.components[1].tz_name(), Some(TimezoneId::from("Asia/Tokyo")));
    }

    #[test]
    fn utc_is_never_synthesized() {
        assert!(matches!(
            Component::timezone_from_tzid("UTC"),
            Err(CoreError::UtcDefinition)
        ));
    }

    #[test]
    fn groups_repeating_transitions_into_rdates() {
        let window = TransitionWindow::new(2021, 2023).unwrap();
        let block = timezone_component(&TimezoneId::from("Europe/Zurich"), &TzdbProvider::new(window))
            .expect("zurich");

        assert_eq!(block.property("TZID").unwrap().value, "Europe/Zurich");
        let kinds: Vec<_> = block.components.iter().map(|c| c.kind.clone()).collect();
        assert_eq!(
            kinds,
            [ComponentKind::Standard, ComponentKind::Daylight, ComponentKind::Standard]
        );

        let daylight = &block.components[1];
        assert_eq!(daylight.property("DTSTART").unwrap().value, "20210328T020000");
        assert_eq!(daylight.property("TZOFFSETFROM").unwrap().value, "+0100");
        assert_eq!(daylight.property("TZOFFSETTO").unwrap().value, "+0200");
        assert_eq!(daylight.property("TZNAME").unwrap().value, "CEST");
        let rdates: Vec<_> = daylight.properties_named("RDATE").map(|p| p.value.as_str()).collect();
        assert_eq!(rdates, ["20220327T020000"]);
    }

    #[test]
    fn synthesized_block_survives_the_wire() {
        let mut calendar = Calendar::new(vec![zurich_event()]);
        calendar.add_missing_timezones().expect("synthesize");
        let parsed = parse_calendar(&calendar.to_ics()).expect("parse");
        assert_eq!(parsed, calendar);
        assert!(missing_identifiers(&parsed).is_empty());
    }

    #[test]
    fn lint_reports_each_timezone_problem() {
        let raw = "BEGIN:VCALENDAR\n\
                   BEGIN:VTIMEZONE\nTZID:UTC\nEND:VTIMEZONE\n\
                   BEGIN:VTIMEZONE\nTZID:Asia/Tokyo\nEND:VTIMEZONE\n\
                   BEGIN:VTIMEZONE\nTZID:Asia/Tokyo\nEND:VTIMEZONE\n\
                   BEGIN:VTIMEZONE\nEND:VTIMEZONE\n\
                   BEGIN:VEVENT\nDTSTART;TZID=UTC:20220101T120000\n\
                   DTEND;TZID=Europe/Zurich:20220101T130000\n\
                   RECURRENCE-ID:not-a-date\nEND:VEVENT\n\
                   END:VCALENDAR\n";
        let calendar = parse_calendar(raw).expect("parse");
        let findings = lint_timezones(&calendar);

        let errors: Vec<_> = findings.errors.iter().map(|f| f.code.as_str()).collect();
        let warnings: Vec<_> = findings.warnings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(errors, ["E002", "E003", "E001", "E004"]);
        assert_eq!(warnings, ["W003", "W001", "W002"]);
        assert!(findings.has_errors());
    }

    #[test]
    fn zero_offset_zone_gets_a_hint_but_stays_referenced() {
        let mut event = Component::new(ComponentKind::Event);
        event.push_property(Property::new("DTSTART", "20220101T120000").with_param("TZID", "Etc/UTC"));
        let calendar = Calendar::new(vec![event]);

        assert_eq!(missing_identifiers(&calendar), ids(&["Etc/UTC"]));
        let findings = lint_timezones(&calendar);
        let hints: Vec<_> = findings.hints.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(hints, ["H001"]);
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn clean_calendar_lints_clean() {
        let mut calendar = Calendar::new(vec![zurich_event()]);
        calendar.add_missing_timezones().expect("synthesize");
        let findings = lint_timezones(&calendar);
        assert!(findings.errors.is_empty(), "{:?}", findings.errors);
        assert!(findings.warnings.is_empty(), "{:?}", findings.warnings);
    }

    #[test]
    fn report_lists_all_three_sets() {
        let mut calendar = Calendar::new(vec![zurich_event()]);
        calendar.add_component(Component::timezone_from_tzid("America/New_York").unwrap());
        let report = timezone_report(&calendar);
        assert_eq!(report.used, ids(&["Europe/Zurich"]));
        assert_eq!(report.defined, ids(&["America/New_York"]));
        assert_eq!(report.missing, ids(&["Europe/Zurich"]));
        assert!(DateTimeValue::from(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()).is_utc());
    }
}
