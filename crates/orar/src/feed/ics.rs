//! iCalendar rendering of a feed.
//!
//! Series, one-shot events and period blocks are mapped onto `ical`
//! components; line folding and the document framing are left to its
//! generator.

use super::{Feed, PeriodBlock};
use crate::schedule::{event_id, SeriesDefinition, UserEvent};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::generator::Emitter;
use ical::parser::ical::component::{IcalCalendar, IcalEvent};
use ical::property::Property;

const PRODID: &str = "-//orar//UBB timetable feed//RO";

/// Serializes `feed` as an iCalendar document.
///
/// Local times carry the IANA name of `tz` as their TZID.
pub fn render_calendar(feed: &Feed, tz: Tz) -> String {
    let stamp = format_utc(feed.generated_at);

    let mut calendar = IcalCalendar::new();
    calendar.properties.extend([
        property("VERSION", "2.0"),
        property("PRODID", PRODID),
        property("CALSCALE", "GREGORIAN"),
        property("METHOD", "PUBLISH"),
        property("X-WR-CALNAME", text(&feed.name)),
        property("X-WR-TIMEZONE", tz.name()),
    ]);

    calendar
        .events
        .extend(feed.series.iter().map(|series| series_event(series, tz, &stamp)));
    calendar.events.extend(feed.single_events.iter().map(|event| {
        let mut component = IcalEvent::new();
        component.properties = event_properties(event, tz, &stamp);
        component
    }));
    calendar
        .events
        .extend(feed.period_blocks.iter().map(|block| block_event(block, &stamp)));

    calendar.generate()
}

fn property(name: &str, value: impl Into<String>) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value.into()),
    }
}

fn property_with(name: &str, param: &str, param_value: &str, value: impl Into<String>) -> Property {
    Property {
        name: name.to_string(),
        params: Some(vec![(param.to_string(), vec![param_value.to_string()])]),
        value: Some(value.into()),
    }
}

/// Escapes a TEXT value. The generator writes values verbatim.
fn text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

fn format_local(value: NaiveDateTime) -> String {
    value.format("%Y%m%dT%H%M%S").to_string()
}

fn format_utc(value: DateTime<Utc>) -> String {
    value.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_date(value: NaiveDate) -> String {
    value.format("%Y%m%d").to_string()
}

/// Interprets a local wall-clock time in `tz` and converts it to UTC.
///
/// Times skipped by a DST jump are read as UTC.
pub fn local_to_utc(value: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&value)
        .earliest()
        .or_else(|| tz.from_local_datetime(&value).latest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&value))
}

fn byday(day_of_week: u8) -> &'static str {
    match day_of_week {
        0 => "SU",
        1 => "MO",
        2 => "TU",
        3 => "WE",
        4 => "TH",
        5 => "FR",
        _ => "SA",
    }
}

fn event_properties(event: &UserEvent, tz: Tz, stamp: &str) -> Vec<Property> {
    let mut properties = vec![
        property("UID", format!("{}@orar", event.id)),
        property("DTSTAMP", stamp),
        property_with("DTSTART", "TZID", tz.name(), format_local(event.start_time)),
        property_with("DTEND", "TZID", tz.name(), format_local(event.end_time)),
        property("SUMMARY", text(&event.title)),
    ];
    if let Some(location) = &event.location {
        properties.push(property("LOCATION", text(location)));
    }
    if let Some(description) = &event.description {
        properties.push(property("DESCRIPTION", text(description)));
    }
    properties.push(property("CATEGORIES", event.kind.as_str().to_uppercase()));
    if let Some(color) = &event.color {
        properties.push(property("COLOR", text(color)));
    }
    properties
}

/// RRULE value of a series. UNTIL is the last start instant in UTC.
fn rrule(series: &SeriesDefinition, tz: Tz) -> String {
    let rule = &series.rule;
    let days: Vec<&str> = rule.days_of_week.iter().map(|d| byday(*d)).collect();
    let mut value = format!("FREQ=WEEKLY;INTERVAL={};BYDAY={}", rule.interval.max(1), days.join(","));
    // UNTIL and COUNT are mutually exclusive
    if let Some(count) = rule.count {
        value.push_str(&format!(";COUNT={}", count));
    } else if let Some(until) = rule.until {
        let last_start = until.and_time(series.event.start_time.time());
        value.push_str(&format!(";UNTIL={}", format_utc(local_to_utc(last_start, tz))));
    }
    value
}

fn series_event(series: &SeriesDefinition, tz: Tz, stamp: &str) -> IcalEvent {
    let mut component = IcalEvent::new();
    component.properties = event_properties(&series.event, tz, stamp);
    component.properties.push(property("RRULE", rrule(series, tz)));

    if !series.exclusions.is_empty() {
        let dates: Vec<String> = series.exclusions.iter().map(|d| format_local(*d)).collect();
        component
            .properties
            .push(property_with("EXDATE", "TZID", tz.name(), dates.join(",")));
    }
    component
}

fn block_event(block: &PeriodBlock, stamp: &str) -> IcalEvent {
    let start = format_date(block.start);
    let end = format_date(block.end);
    let uid = event_id(&["period", &start, &end, block.kind.as_str()]);

    let mut component = IcalEvent::new();
    component.properties = vec![
        property("UID", format!("{}@orar", uid)),
        property("DTSTAMP", stamp),
        property_with("DTSTART", "VALUE", "DATE", start),
        // DTEND is exclusive for all-day events
        property_with("DTEND", "VALUE", "DATE", format_date(block.end + Duration::days(1))),
        property("SUMMARY", text(&block.description)),
        property("CATEGORIES", block.kind.as_str().to_uppercase()),
        property("TRANSP", "TRANSPARENT"),
    ];
    component
}
