/// Types for calendar events and their recurrence
use crate::timetable::fold_key;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// How often a class repeats across the semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Weekly,
    Biweekly,
    /// Semester weeks 1, 3, 5, ...
    OddWeeks,
    /// Semester weeks 2, 4, 6, ...
    EvenWeeks,
}

impl Frequency {
    /// Maps the free-text frequency cell of a timetable row.
    ///
    /// Unknown or empty markers mean the class runs every week.
    pub fn from_marker(marker: &str) -> Frequency {
        let folded = fold_key(marker);
        let compact: String = folded.chars().filter(|c| !c.is_whitespace()).collect();
        let tokens: Vec<&str> = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        // "s1" and "s 1" only count as whole tokens, so group codes like "s12" don't match
        let has_week = |week: &str| {
            ["sapt.", "sapt"]
                .iter()
                .any(|prefix| contains_week_marker(&compact, &format!("{prefix}{week}")))
                || tokens.iter().any(|t| t.strip_prefix('s') == Some(week))
                || tokens.windows(2).any(|pair| pair[0] == "s" && pair[1] == week)
        };

        if has_week("1") {
            Frequency::OddWeeks
        } else if has_week("2") {
            Frequency::EvenWeeks
        } else {
            Frequency::Weekly
        }
    }

    /// Weeks between two consecutive occurrences.
    pub fn interval(&self) -> u32 {
        match self {
            Frequency::Weekly => 1,
            _ => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::OddWeeks => "oddweeks",
            Frequency::EvenWeeks => "evenweeks",
        }
    }
}

/// Whether `marker` occurs in `text` without being the prefix of a longer number.
fn contains_week_marker(text: &str, marker: &str) -> bool {
    text.match_indices(marker)
        .any(|(i, m)| !text[i + m.len()..].starts_with(|c: char| c.is_ascii_digit()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Lecture,
    Lab,
    Seminar,
    #[default]
    Custom,
}

impl EventType {
    /// Maps the free-text type cell ("Curs", "Laborator", ...). Anything else is custom.
    pub fn from_label(label: &str) -> EventType {
        let folded = fold_key(label);
        if folded.starts_with("curs") || folded.starts_with("lecture") {
            EventType::Lecture
        } else if folded.starts_with("seminar") {
            EventType::Seminar
        } else if folded.starts_with("lab") {
            EventType::Lab
        } else {
            EventType::Custom
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Lecture => "lecture",
            EventType::Lab => "lab",
            EventType::Seminar => "seminar",
            EventType::Custom => "custom",
        }
    }
}

/// Recurrence of a `UserEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// 0 = Sunday
    pub days_of_week: Vec<u8>,
    pub interval: u32,
    /// Last day (inclusive) an occurrence may start on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl RecurrenceRule {
    /// A rule for one weekday with the interval implied by `frequency`.
    pub fn new(frequency: Frequency, day_of_week: u8) -> Self {
        Self {
            frequency,
            days_of_week: vec![day_of_week],
            interval: frequency.interval(),
            until: None,
            count: None,
        }
    }
}

/// A calendar event template. Times are local to the feed's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub id: String,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<RecurrenceRule>,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Wall-clock time as written in timetable JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

/// A timetable entry supplied by a user rather than scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTimetableEntry {
    /// English day name
    pub day: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(rename = "type", default)]
    pub kind: EventType,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A user's timetable as accepted by feed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTimetable {
    pub id: String,
    pub name: String,
    /// e.g. "2025-2026"
    pub academic_year: String,
    pub semester: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_end: Option<NaiveDate>,
    pub entries: Vec<UserTimetableEntry>,
}

impl UserTimetable {
    /// First calendar year of the academic year ("2025-2026" -> 2025).
    pub fn first_year(&self) -> Option<i32> {
        self.academic_year.split(['-', '/']).next()?.trim().parse().ok()
    }
}

/// A recurring event resolved against the academic calendar.
///
/// `event.start_time` is the first occurrence (parity already applied) and
/// `rule.until` is always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDefinition {
    pub event: UserEvent,
    pub rule: RecurrenceRule,
    /// Local start times of skipped occurrences, sorted
    pub exclusions: Vec<NaiveDateTime>,
}

/// One concrete meeting of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub event_id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
