use chrono::{DateTime, SubsecRound, Utc};

use crate::descriptor::{DtEnd, DtStamp, DtStart, Due, PropertyDescriptor, Summary, Uid};
use crate::value::DateTimeValue;

const DEFAULT_PRODID: &str = "-//vtzfill//vtzfill-core//EN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

/// One content line: upper-cased name, ordered parameters and the raw wire value.
///
/// The value is kept exactly as read so that a lenient parse never loses data;
/// typed interpretation happens in the descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    /// First value of the named parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.values.first())
            .map(String::as_str)
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        let values = vec![value.into()];
        match self
            .params
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.values = values,
            None => self.params.push(Parameter {
                name: name.to_ascii_uppercase(),
                values,
            }),
        }
    }

    pub fn remove_param(&mut self, name: &str) {
        self.params.retain(|p| !p.name.eq_ignore_ascii_case(name));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    Calendar,
    Event,
    Todo,
    Journal,
    FreeBusy,
    Timezone,
    Standard,
    Daylight,
    Alarm,
    Availability,
    Available,
    Other(String),
}

impl ComponentKind {
    pub fn from_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            "VALARM" => Self::Alarm,
            "VAVAILABILITY" => Self::Availability,
            "AVAILABLE" => Self::Available,
            _ => Self::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
            Self::Alarm => "VALARM",
            Self::Availability => "VAVAILABILITY",
            Self::Available => "AVAILABLE",
            Self::Other(name) => name,
        }
    }
}

/// A named bag of properties plus nested components, both in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
}

/// Inputs for [`Component::event`], [`Component::todo`] and [`Component::journal`].
///
/// Times are written at whole-second precision; any sub-second part is truncated.
#[derive(Debug, Clone, Default)]
pub struct ComponentDraft {
    pub summary: Option<String>,
    pub start: Option<DateTimeValue>,
    /// `DTEND` for events, `DUE` for todos, ignored for journals.
    pub end: Option<DateTimeValue>,
    pub uid: Option<String>,
    /// Defaults to the current time.
    pub stamp: Option<DateTime<Utc>>,
}

impl Component {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn event(draft: ComponentDraft) -> Self {
        Self::from_draft(ComponentKind::Event, draft)
    }

    pub fn todo(draft: ComponentDraft) -> Self {
        Self::from_draft(ComponentKind::Todo, draft)
    }

    pub fn journal(draft: ComponentDraft) -> Self {
        Self::from_draft(ComponentKind::Journal, draft)
    }

    fn from_draft(kind: ComponentKind, draft: ComponentDraft) -> Self {
        let mut component = Self::new(kind);
        let stamp = draft.stamp.unwrap_or_else(Utc::now).trunc_subsecs(0);
        let uid = draft
            .uid
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        component.push_property(DtStamp::encode(&DateTimeValue::from(stamp)));
        component.push_property(Uid::encode(&uid));
        if let Some(summary) = &draft.summary {
            component.push_property(Summary::encode(summary));
        }
        if let Some(start) = &draft.start {
            component.push_property(DtStart::encode(start));
        }
        if let Some(end) = &draft.end {
            match component.kind {
                ComponentKind::Todo => component.push_property(Due::encode(end)),
                ComponentKind::Journal => {}
                _ => component.push_property(DtEnd::encode(end)),
            }
        }
        component
    }

    pub fn contains(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn push_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Replaces every occurrence of the property's name with this single property,
    /// keeping the position of the first occurrence.
    pub fn replace_property(&mut self, property: Property) {
        let position = self
            .properties
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(&property.name));
        self.remove_property(&property.name);
        match position {
            Some(index) => self.properties.insert(index, property),
            None => self.properties.push(property),
        }
    }

    /// Removes every occurrence of a property and returns how many were dropped.
    pub fn remove_property(&mut self, name: &str) -> usize {
        let before = self.properties.len();
        self.properties.retain(|p| !p.name.eq_ignore_ascii_case(name));
        before - self.properties.len()
    }

    pub fn push_component(&mut self, component: Component) {
        self.components.push(component);
    }
}

/// A `VCALENDAR`: calendar-level properties and its ordered top-level components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
}

impl Calendar {
    /// A calendar with `VERSION` and `PRODID` set.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            properties: vec![
                Property::new("VERSION", "2.0"),
                Property::new("PRODID", DEFAULT_PRODID),
            ],
            components,
        }
    }

    pub(crate) fn from_component(component: Component) -> Self {
        Self {
            properties: component.properties,
            components: component.components,
        }
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn timezones(&self) -> impl Iterator<Item = &Component> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Timezone)
    }
}
