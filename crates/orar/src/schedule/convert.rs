//! Conversion of timetable rows into calendar event templates.

use super::types::*;
use crate::academic::{semester_for, AcademicYearStructure, Semester};
use crate::timetable::{fold_key, Timetable, TimetableEntry};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::sync::LazyLock;
use tracing::{debug, warn};

static HOURS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:[:.](\d{2}))?\s*[-–]\s*(\d{1,2})(?:[:.](\d{2}))?$").unwrap()
});

/// Maps a Romanian or English day name to a weekday.
pub fn parse_day(day: &str) -> Option<Weekday> {
    let folded = fold_key(day);
    let weekday = match folded.trim_end_matches('.') {
        "luni" | "monday" | "mon" => Weekday::Mon,
        "marti" | "tuesday" | "tue" => Weekday::Tue,
        "miercuri" | "wednesday" | "wed" => Weekday::Wed,
        "joi" | "thursday" | "thu" => Weekday::Thu,
        "vineri" | "friday" | "fri" => Weekday::Fri,
        "sambata" | "saturday" | "sat" => Weekday::Sat,
        "duminica" | "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Parses an hours cell ("8-10", "8:30-10", "14.00 - 16.00").
///
/// Returns `None` unless the end is strictly after the start.
pub fn parse_hours(hours: &str) -> Option<(NaiveTime, NaiveTime)> {
    let caps = HOURS_REGEX.captures(hours.trim())?;
    let part = |i: usize| caps.get(i).map_or(Ok(0), |m| m.as_str().parse::<u32>());

    let start = NaiveTime::from_hms_opt(part(1).ok()?, part(2).ok()?, 0)?;
    let end = NaiveTime::from_hms_opt(part(3).ok()?, part(4).ok()?, 0)?;
    (start < end).then_some((start, end))
}

/// First Monday on or after the conventional semester start.
///
/// # Arguments
/// * `semester` - Semester of the academic year
/// * `first_year` - First calendar year of the academic year (2025 for 2025-2026)
pub fn default_semester_start(semester: Semester, first_year: i32) -> NaiveDate {
    let (year, month, day) = match semester {
        Semester::I => (first_year, 9, 29),
        Semester::II => (first_year + 1, 2, 24),
    };
    // Both dates exist in every year
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
    next_weekday(date, Weekday::Mon)
}

/// Picks the semester start date.
///
/// The first teaching day from the academic calendar wins, then the
/// caller's date, then the conventional default. The result may fall
/// mid-week; semester weeks are counted from the Monday of its week.
pub fn resolve_semester_start(
    structure: Option<&AcademicYearStructure>,
    semester: Semester,
    is_terminal_year: bool,
    caller_start: Option<NaiveDate>,
    first_year: i32,
) -> NaiveDate {
    if let Some(start) = structure
        .and_then(|s| semester_for(s, semester, is_terminal_year))
        .and_then(|block| block.first_teaching_day())
    {
        return start;
    }
    caller_start.unwrap_or_else(|| default_semester_start(semester, first_year))
}

/// The first date on or after `from` that falls on `weekday`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from + Duration::days(ahead as i64)
}

/// Stable identifier for an event built from its identifying fields.
pub fn event_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let digest = hasher.finalize();
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

/// Builds a recurring event for one weekly slot.
#[allow(clippy::too_many_arguments)]
fn recurring_event(
    id: String,
    title: &str,
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
    semester_start: NaiveDate,
    frequency: Frequency,
    kind: EventType,
    location: Option<String>,
    description: Option<String>,
    color: Option<String>,
) -> UserEvent {
    let first = next_weekday(semester_start, weekday);
    UserEvent {
        id,
        title: title.to_string(),
        start_time: first.and_time(start),
        end_time: first.and_time(end),
        location,
        description,
        is_recurring: true,
        recurrence_rule: Some(RecurrenceRule::new(
            frequency,
            weekday.num_days_from_sunday() as u8,
        )),
        kind,
        color,
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Converts a scraped timetable row into an event template.
///
/// Returns `None` (and logs) when the day or hours can't be read.
pub fn event_from_entry(entry: &TimetableEntry, semester_start: NaiveDate) -> Option<UserEvent> {
    let Some(weekday) = parse_day(&entry.day) else {
        warn!(day = %entry.day, subject = %entry.subject, "Skipping entry with unknown day");
        return None;
    };
    let Some((start, end)) = parse_hours(&entry.hours) else {
        warn!(hours = %entry.hours, subject = %entry.subject, "Skipping entry with unreadable hours");
        return None;
    };

    let description = [
        entry.kind.as_str(),
        entry.teacher.as_str(),
        entry.group.as_str(),
        entry.frequency.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("\n");

    let id = event_id(&[
        &entry.day,
        &entry.hours,
        &entry.frequency,
        &entry.room,
        &entry.group,
        &entry.kind,
        &entry.subject,
    ]);

    Some(recurring_event(
        id,
        &entry.subject,
        weekday,
        start,
        end,
        semester_start,
        Frequency::from_marker(&entry.frequency),
        EventType::from_label(&entry.kind),
        non_empty(&entry.room),
        non_empty(&description),
        None,
    ))
}

/// Converts every usable row of a scraped timetable.
pub fn events_from_timetable(timetable: &Timetable, semester_start: NaiveDate) -> Vec<UserEvent> {
    let events: Vec<UserEvent> = timetable
        .entries()
        .iter()
        .filter_map(|entry| event_from_entry(entry, semester_start))
        .collect();
    debug!(
        entries = timetable.entries().len(),
        events = events.len(),
        "Converted scraped timetable"
    );
    events
}

/// Converts a user-supplied entry into an event template.
pub fn event_from_user_entry(
    timetable_id: &str,
    entry: &UserTimetableEntry,
    semester_start: NaiveDate,
) -> Option<UserEvent> {
    let Some(weekday) = parse_day(&entry.day) else {
        warn!(day = %entry.day, subject = %entry.subject, "Skipping entry with unknown day");
        return None;
    };
    let (Some(start), Some(end)) = (entry.start_time.to_naive(), entry.end_time.to_naive()) else {
        warn!(subject = %entry.subject, "Skipping entry with invalid time of day");
        return None;
    };
    if start >= end {
        warn!(subject = %entry.subject, "Skipping entry that ends before it starts");
        return None;
    }

    let description = [entry.teacher.as_deref(), entry.group.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let start_label = start.format("%H:%M").to_string();
    let id = event_id(&[
        timetable_id,
        &entry.day,
        &start_label,
        entry.frequency.as_str(),
        entry.kind.as_str(),
        &entry.subject,
        entry.group.as_deref().unwrap_or_default(),
    ]);

    Some(recurring_event(
        id,
        &entry.subject,
        weekday,
        start,
        end,
        semester_start,
        entry.frequency,
        entry.kind,
        entry.room.clone().filter(|r| !r.is_empty()),
        non_empty(&description),
        entry.color.clone(),
    ))
}

/// Converts every usable entry of a user timetable.
pub fn events_from_user_timetable(timetable: &UserTimetable, semester_start: NaiveDate) -> Vec<UserEvent> {
    timetable
        .entries
        .iter()
        .filter_map(|entry| event_from_user_entry(&timetable.id, entry, semester_start))
        .collect()
}
