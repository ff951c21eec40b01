//! Timezone transition data for synthesized `VTIMEZONE` blocks.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::{OffsetComponents, Tz};
use serde::Serialize;

use crate::CoreError;
use crate::value::{TimezoneId, UtcOffset};

const DEFAULT_FIRST_YEAR: i32 = 1970;
const DEFAULT_LAST_YEAR: i32 = 2038;
/// Years outside this range have no `YYYYMMDD` spelling on the wire.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;
const MAX_SPAN_YEARS: i32 = 1000;

/// Years (January 1st UTC, end exclusive) for which transitions are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionWindow {
    first_year: i32,
    last_year: i32,
}

impl TransitionWindow {
    /// Accepts `MIN_YEAR <= first_year < last_year <= MAX_YEAR`, at most
    /// `MAX_SPAN_YEARS` apart.
    pub fn new(first_year: i32, last_year: i32) -> Result<Self, CoreError> {
        let window = Self {
            first_year,
            last_year,
        };
        let in_range = (MIN_YEAR..=MAX_YEAR).contains(&first_year)
            && (MIN_YEAR..=MAX_YEAR).contains(&last_year);
        if !in_range || first_year >= last_year || last_year - first_year > MAX_SPAN_YEARS {
            return Err(window.invalid());
        }
        Ok(window)
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.last_year
    }

    fn invalid(&self) -> CoreError {
        CoreError::InvalidWindow {
            first: self.first_year,
            last: self.last_year,
        }
    }

    fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime), CoreError> {
        let start = year_start(self.first_year).ok_or_else(|| self.invalid())?;
        let end = year_start(self.last_year).ok_or_else(|| self.invalid())?;
        Ok((start, end))
    }
}

impl Default for TransitionWindow {
    fn default() -> Self {
        Self {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
        }
    }
}

fn year_start(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservanceKind {
    Standard,
    Daylight,
}

/// One change of UTC offset, as a `STANDARD`/`DAYLIGHT` sub-block describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub kind: ObservanceKind,
    pub offset_from: UtcOffset,
    pub offset_to: UtcOffset,
    /// Abbreviation such as `CET`, if the zone database has one.
    pub name: Option<String>,
    /// Wall-clock time of the transition, expressed in `offset_from`.
    pub start: NaiveDateTime,
}

pub trait RuleProvider {
    /// Ordered transition rules for a zone, or [`CoreError::UnknownTimezone`].
    fn resolve(&self, tzid: &TimezoneId) -> Result<Vec<TransitionRule>, CoreError>;
}

/// Resolves IANA identifiers against the database compiled into `chrono-tz`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzdbProvider {
    window: TransitionWindow,
}

impl TzdbProvider {
    pub fn new(window: TransitionWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> TransitionWindow {
        self.window
    }
}

impl RuleProvider for TzdbProvider {
    fn resolve(&self, tzid: &TimezoneId) -> Result<Vec<TransitionRule>, CoreError> {
        let tz = parse_timezone(tzid.as_str())?;
        let (start, end) = self.window.bounds()?;
        let to_local = |utc: NaiveDateTime, offset: UtcOffset| {
            utc.checked_add_signed(offset.as_duration())
                .ok_or_else(|| self.window.invalid())
        };

        let mut current = state_at(tz, start);
        let mut rules = vec![TransitionRule {
            kind: current.kind(),
            offset_from: current.offset,
            offset_to: current.offset,
            name: current.name.clone(),
            start: to_local(start, current.offset)?,
        }];

        let mut cursor = start;
        while cursor < end {
            let next = cursor
                .checked_add_signed(Duration::days(1))
                .map_or(end, |next| next.min(end));
            if state_at(tz, next) == current {
                cursor = next;
                continue;
            }

            let instant =
                locate_transition(tz, cursor, next, &current).ok_or_else(|| self.window.invalid())?;
            let state = state_at(tz, instant);
            rules.push(TransitionRule {
                kind: state.kind(),
                offset_from: current.offset,
                offset_to: state.offset,
                name: state.name.clone(),
                start: to_local(instant, current.offset)?,
            });
            current = state;
            cursor = instant;
        }

        Ok(rules)
    }
}

pub(crate) fn parse_timezone(value: &str) -> Result<Tz, CoreError> {
    value
        .parse::<Tz>()
        .map_err(|_| CoreError::UnknownTimezone(value.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ZoneState {
    offset: UtcOffset,
    dst: bool,
    name: Option<String>,
}

impl ZoneState {
    fn kind(&self) -> ObservanceKind {
        if self.dst {
            ObservanceKind::Daylight
        } else {
            ObservanceKind::Standard
        }
    }
}

fn state_at(tz: Tz, utc: NaiveDateTime) -> ZoneState {
    let offset = tz.offset_from_utc_datetime(&utc);
    let name = offset.to_string();
    ZoneState {
        offset: UtcOffset::from_seconds(offset.fix().local_minus_utc()),
        dst: offset.dst_offset() != Duration::zero(),
        name: (!name.is_empty()).then_some(name),
    }
}

/// Binary search over whole seconds for the first one whose state differs
/// from `before_state`.
fn locate_transition(
    tz: Tz,
    before: NaiveDateTime,
    after: NaiveDateTime,
    before_state: &ZoneState,
) -> Option<NaiveDateTime> {
    let mut low = before.and_utc().timestamp();
    let mut high = after.and_utc().timestamp();
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if state_at(tz, utc_second(mid)?) == *before_state {
            low = mid;
        } else {
            high = mid;
        }
    }
    utc_second(high)
}

fn utc_second(timestamp: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DateTimeValue;
    use chrono::Timelike;

    fn local(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn unknown_zone_is_a_resolution_error() {
        let err = TzdbProvider::default()
            .resolve(&TimezoneId::from("Mars/Olympus"))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownTimezone(ref id) if id == "Mars/Olympus"));
    }

    #[test]
    fn window_must_be_ordered() {
        assert!(TransitionWindow::new(2000, 2000).is_err());
        assert!(TransitionWindow::new(2010, 2000).is_err());
        let window = TransitionWindow::new(2000, 2001).expect("window");
        assert_eq!((window.first_year(), window.last_year()), (2000, 2001));
    }

    #[test]
    fn window_stays_within_four_digit_years() {
        for (first, last) in [(-262_143, -262_142), (-5, -4), (0, 1), (9999, 10_000), (1, 2000)] {
            assert!(
                matches!(
                    TransitionWindow::new(first, last),
                    Err(CoreError::InvalidWindow { first: f, last: l }) if f == first && l == last
                ),
                "{first}..{last} should be rejected"
            );
        }
        assert!(TransitionWindow::new(9000, 9999).is_ok());
        assert!(TransitionWindow::new(1, 1001).is_ok());
    }

    #[test]
    fn earliest_window_emits_decodable_starts() {
        let window = TransitionWindow::new(1, 2).unwrap();
        let rules = TzdbProvider::new(window)
            .resolve(&TimezoneId::from("Asia/Tokyo"))
            .expect("tokyo");
        assert_eq!(rules.len(), 1);

        let wire = DateTimeValue::Floating(rules[0].start).to_wire();
        assert!(wire.starts_with("00010101T"), "{wire}");
        assert_eq!(
            DateTimeValue::from_wire(&wire, None, None),
            Ok(DateTimeValue::Floating(rules[0].start))
        );
    }

    #[test]
    fn transition_starts_fall_on_whole_seconds() {
        let window = TransitionWindow::new(1970, 2038).unwrap();
        let rules = TzdbProvider::new(window)
            .resolve(&TimezoneId::from("America/New_York"))
            .expect("new york");
        assert!(rules.iter().all(|rule| rule.start.nanosecond() == 0));
    }

    #[test]
    fn zone_without_transitions_yields_one_standard_rule() {
        let rules = TzdbProvider::default()
            .resolve(&TimezoneId::from("Asia/Tokyo"))
            .expect("tokyo");
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.kind, ObservanceKind::Standard);
        assert_eq!(rule.offset_from, UtcOffset::from_seconds(9 * 3600));
        assert_eq!(rule.offset_to, rule.offset_from);
        assert_eq!(rule.name.as_deref(), Some("JST"));
        assert_eq!(rule.start, local(1970, 1, 1, 9));
    }

    #[test]
    fn zurich_switches_to_summer_time_in_march() {
        let window = TransitionWindow::new(2022, 2023).unwrap();
        let rules = TzdbProvider::new(window)
            .resolve(&TimezoneId::from("Europe/Zurich"))
            .expect("zurich");

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].kind, ObservanceKind::Standard);
        assert_eq!(rules[0].name.as_deref(), Some("CET"));

        let spring = &rules[1];
        assert_eq!(spring.kind, ObservanceKind::Daylight);
        assert_eq!(spring.offset_from.to_string(), "+0100");
        assert_eq!(spring.offset_to.to_string(), "+0200");
        assert_eq!(spring.name.as_deref(), Some("CEST"));
        assert_eq!(spring.start, local(2022, 3, 27, 2));

        let autumn = &rules[2];
        assert_eq!(autumn.kind, ObservanceKind::Standard);
        assert_eq!(autumn.offset_from.to_string(), "+0200");
        assert_eq!(autumn.offset_to.to_string(), "+0100");
        assert_eq!(autumn.start, local(2022, 10, 30, 3));
    }

    #[test]
    fn new_york_has_two_transitions_per_year() {
        let window = TransitionWindow::new(2020, 2025).unwrap();
        let rules = TzdbProvider::new(window)
            .resolve(&TimezoneId::from("America/New_York"))
            .expect("new york");
        assert_eq!(rules.len(), 1 + 2 * 5);
        assert!(
            rules[1..]
                .iter()
                .all(|r| r.offset_from != r.offset_to && r.start.format("%H").to_string() == "02")
        );
    }
}
