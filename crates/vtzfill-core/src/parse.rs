//! Lenient iCalendar reader: unfolds lines, splits content lines and builds
//! the component tree. Unreadable lines are skipped with a warning; only
//! structural problems (unbalanced BEGIN/END) are errors.

use tracing::warn;

use crate::CoreError;
use crate::model::{Calendar, Component, ComponentKind, Parameter, Property};

/// Parses the first `VCALENDAR` in the input.
pub fn parse_calendar(input: &str) -> Result<Calendar, CoreError> {
    parse_calendars(input)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::InvalidIcs("no VCALENDAR component found".to_string()))
}

/// Parses every top-level `VCALENDAR` in the input, in order.
pub fn parse_calendars(input: &str) -> Result<Vec<Calendar>, CoreError> {
    let mut calendars = Vec::new();
    let mut stack: Vec<(usize, Component)> = Vec::new();

    for (line_no, line) in unfold_ics_lines(input) {
        let Some(property) = parse_content_line(&line) else {
            warn!(line = line_no, "skipping line without a property name and ':' separator");
            continue;
        };

        match property.name.as_str() {
            "BEGIN" => {
                let kind = ComponentKind::from_name(&property.value);
                stack.push((line_no, Component::new(kind)));
            }
            "END" => {
                let name = property.value.trim().to_ascii_uppercase();
                let Some((_, component)) = stack.pop() else {
                    return Err(invalid(line_no, format!("END:{name} without matching BEGIN")));
                };
                if component.kind.as_str() != name {
                    return Err(invalid(
                        line_no,
                        format!("END:{name} does not close BEGIN:{}", component.kind.as_str()),
                    ));
                }

                match stack.last_mut() {
                    Some((_, parent)) => parent.components.push(component),
                    None if component.kind == ComponentKind::Calendar => {
                        calendars.push(Calendar::from_component(component));
                    }
                    None => warn!(
                        line = line_no,
                        component = component.kind.as_str(),
                        "skipping component outside VCALENDAR"
                    ),
                }
            }
            _ => match stack.last_mut() {
                Some((_, component)) => component.properties.push(property),
                None => warn!(
                    line = line_no,
                    property = property.name.as_str(),
                    "skipping property outside any component"
                ),
            },
        }
    }

    if let Some((line_no, open)) = stack.last() {
        return Err(invalid(
            *line_no,
            format!("BEGIN:{} is never closed", open.kind.as_str()),
        ));
    }

    if calendars.is_empty() {
        return Err(CoreError::InvalidIcs(
            "no VCALENDAR component found".to_string(),
        ));
    }

    Ok(calendars)
}

impl Calendar {
    pub fn from_bytes(input: &[u8]) -> Result<Self, CoreError> {
        let text = std::str::from_utf8(input)
            .map_err(|err| CoreError::InvalidIcs(format!("input is not UTF-8: {err}")))?;
        parse_calendar(text)
    }
}

fn invalid(line_no: usize, reason: String) -> CoreError {
    CoreError::InvalidIcs(format!("line {line_no}: {reason}"))
}

/// Joins continuation lines; each logical line carries the number of its first physical line.
fn unfold_ics_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (index, raw) in input.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.starts_with(' ') || raw.starts_with('\t') {
            if let Some((_, last)) = lines.last_mut() {
                last.push_str(&raw[1..]);
                continue;
            }
        }
        if raw.trim().is_empty() {
            continue;
        }
        lines.push((index + 1, raw.to_string()));
    }

    lines
}

/// Splits `NAME;PARAM=VALUE:VALUE`, honouring double-quoted parameter values.
fn parse_content_line(line: &str) -> Option<Property> {
    let colon = find_unquoted(line, ':')?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut parts = split_unquoted(head, ';').into_iter();
    let name = parts.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }

    let mut params = Vec::new();
    for part in parts {
        let Some((key, raw_values)) = part.split_once('=') else {
            continue;
        };
        params.push(Parameter {
            name: key.trim().to_ascii_uppercase(),
            values: split_unquoted(raw_values, ',')
                .into_iter()
                .map(|v| v.trim().trim_matches('"').to_string())
                .collect(),
        });
    }

    Some(Property {
        name,
        params,
        value: value.to_string(),
    })
}

fn find_unquoted(input: &str, needle: char) -> Option<usize> {
    let mut quoted = false;
    for (index, ch) in input.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            c if c == needle && !quoted => return Some(index),
            _ => {}
        }
    }
    None
}

fn split_unquoted(input: &str, separator: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = input;
    while let Some(index) = find_unquoted(rest, separator) {
        out.push(&rest[..index]);
        rest = &rest[index + separator.len_utf8()..];
    }
    out.push(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_ics() {
        let raw = "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\nDTSTART;TZID=Europe/Berlin:20260301T100000\nRRULE:FREQ=WEEKLY;COUNT=2\nEND:VEVENT\nEND:VCALENDAR\n";
        let calendar = parse_calendar(raw).expect("ics parse");
        assert_eq!(calendar.properties.len(), 1);
        assert_eq!(calendar.components.len(), 1);

        let event = &calendar.components[0];
        assert_eq!(event.kind, ComponentKind::Event);
        let dtstart = event.property("DTSTART").expect("dtstart");
        assert_eq!(dtstart.param("TZID"), Some("Europe/Berlin"));
        assert_eq!(event.property("RRULE").unwrap().value, "FREQ=WEEKLY;COUNT=2");
    }

    #[test]
    fn unfolds_continuation_lines() {
        let raw = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:Long\r\n  meeting\r\n\ttitle\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let calendar = parse_calendar(raw).expect("parse");
        assert_eq!(
            calendar.components[0].property("SUMMARY").unwrap().value,
            "Long meetingtitle"
        );
    }

    #[test]
    fn quoted_parameters_may_contain_separators() {
        let property =
            parse_content_line("ATTENDEE;CN=\"Doe, Jane; PhD\";DELEGATED-FROM=\"mailto:a@x\",\"mailto:b@x\":mailto:jane@x")
                .expect("line");
        assert_eq!(property.param("CN"), Some("Doe, Jane; PhD"));
        assert_eq!(
            property.params[1].values,
            vec!["mailto:a@x".to_string(), "mailto:b@x".to_string()]
        );
        assert_eq!(property.value, "mailto:jane@x");
    }

    #[test]
    fn keeps_empty_values_and_skips_garbage() {
        let raw = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nthis line has no separator\nDESCRIPTION:\nRECURRENCE-ID;TZID=Europe/Zurich:\nEND:VEVENT\nEND:VCALENDAR\n";
        let calendar = parse_calendar(raw).expect("lenient parse");
        let event = &calendar.components[0];
        assert_eq!(event.properties.len(), 2);
        assert_eq!(event.property("RECURRENCE-ID").unwrap().value, "");
    }

    #[test]
    fn rejects_unbalanced_components() {
        let err = parse_calendar("BEGIN:VCALENDAR\nBEGIN:VEVENT\nEND:VTODO\nEND:VCALENDAR\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let err = parse_calendar("BEGIN:VCALENDAR\nBEGIN:VEVENT\n").unwrap_err();
        assert!(err.to_string().contains("never closed"));

        assert!(parse_calendar("END:VCALENDAR\n").is_err());
        assert!(parse_calendar("").is_err());
    }

    #[test]
    fn reads_several_calendars() {
        let raw = "BEGIN:VCALENDAR\nEND:VCALENDAR\nBEGIN:VCALENDAR\nVERSION:2.0\nEND:VCALENDAR\n";
        let calendars = parse_calendars(raw).expect("parse");
        assert_eq!(calendars.len(), 2);
        assert!(calendars[1].properties[0].name == "VERSION");
    }

    #[test]
    fn rejects_non_utf8_bytes() {
        assert!(matches!(
            Calendar::from_bytes(&[0xff, 0xfe, 0x00]),
            Err(CoreError::InvalidIcs(_))
        ));
    }
}
