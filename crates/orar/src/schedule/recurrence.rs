//! Recurrence resolution: series end, odd/even week alignment, vacation
//! exclusions and occurrence expansion.

use super::types::*;
use crate::academic::{is_non_teaching_day, semester_for, vacation_periods, AcademicYearStructure, Semester};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use tracing::debug;

/// Length of the fallback series when nothing else bounds it.
pub const FALLBACK_SEMESTER_WEEKS: i64 = 14;

/// Everything a series needs from the semester it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct SeriesContext<'a> {
    pub semester: Semester,
    /// First day of classes. Semester week 1 is the Monday-to-Sunday week containing it.
    pub semester_start: NaiveDate,
    pub is_terminal_year: bool,
    /// Missing when the academic calendar is unavailable
    pub structure: Option<&'a AcademicYearStructure>,
    /// Explicit series end requested by the caller
    pub until: Option<NaiveDate>,
    /// Semester end supplied with the timetable
    pub semester_end: Option<NaiveDate>,
}

/// Resolves the last day a series may run.
///
/// Explicit end, then the last teaching period of the matching semester,
/// then the caller's semester end, then 14 weeks from the first occurrence.
pub fn resolve_until(context: &SeriesContext, first_occurrence: NaiveDate) -> NaiveDate {
    if let Some(until) = context.until {
        return until;
    }
    if let Some(end) = context
        .structure
        .and_then(|s| semester_for(s, context.semester, context.is_terminal_year))
        .and_then(|block| block.teaching_end())
    {
        return end;
    }
    context.semester_end.unwrap_or_else(|| {
        first_occurrence + Duration::weeks(FALLBACK_SEMESTER_WEEKS) - Duration::days(1)
    })
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// 1-based semester week that `date` falls in.
///
/// Weeks run Monday to Sunday, so a semester starting mid-week still has
/// every weekday of its first calendar week in week 1.
pub fn semester_week(semester_start: NaiveDate, date: NaiveDate) -> i64 {
    (date - week_start(semester_start)).num_days().div_euclid(7) + 1
}

/// Moves `candidate` forward one week if it lands in a week of the wrong parity.
pub fn align_to_parity(candidate: NaiveDate, semester_start: NaiveDate, frequency: Frequency) -> NaiveDate {
    let odd_week = semester_week(semester_start, candidate) % 2 != 0;
    let misaligned = match frequency {
        Frequency::OddWeeks => !odd_week,
        Frequency::EvenWeeks => odd_week,
        Frequency::Weekly | Frequency::Biweekly => false,
    };
    if misaligned {
        candidate + Duration::weeks(1)
    } else {
        candidate
    }
}

/// Vacation days on the event's weekdays inside `[first, until]`, at the
/// event's start time.
pub fn exclusion_dates(
    structure: &AcademicYearStructure,
    days_of_week: &[u8],
    start: NaiveDateTime,
    until: NaiveDate,
) -> Vec<NaiveDateTime> {
    let first = start.date();
    let mut dates = BTreeSet::new();

    for period in vacation_periods(structure) {
        let from = period.start_date.max(first);
        let to = period.end_date.min(until);
        for day in from.iter_days().take_while(|d| *d <= to) {
            if days_of_week.contains(&(day.weekday().num_days_from_sunday() as u8)) {
                dates.insert(day.and_time(start.time()));
            }
        }
    }

    dates.into_iter().collect()
}

/// Resolves a recurring event into a bounded series.
///
/// Returns `None` for one-shot events, for events whose first occurrence
/// falls on a non-teaching day, and for series that would be empty.
pub fn synthesize_series(event: &UserEvent, context: &SeriesContext) -> Option<SeriesDefinition> {
    if !event.is_recurring {
        return None;
    }
    let template = event.recurrence_rule.as_ref()?;

    let duration = event.end_time - event.start_time;
    let first_date = align_to_parity(event.start_time.date(), context.semester_start, template.frequency);
    let start = first_date.and_time(event.start_time.time());

    if event.kind != EventType::Custom {
        if let Some(structure) = context.structure {
            if is_non_teaching_day(first_date, structure) {
                debug!(event = %event.title, date = %first_date, "Dropping event starting on a non-teaching day");
                return None;
            }
        }
    }

    let until = template.until.unwrap_or_else(|| resolve_until(context, first_date));
    if first_date > until {
        debug!(event = %event.title, until = %until, "Dropping event that starts after its series end");
        return None;
    }

    let exclusions = match (event.kind, context.structure) {
        (EventType::Custom, _) | (_, None) => Vec::new(),
        (_, Some(structure)) => exclusion_dates(structure, &template.days_of_week, start, until),
    };

    let rule = RecurrenceRule {
        interval: template.frequency.interval(),
        until: Some(until),
        ..template.clone()
    };

    Some(SeriesDefinition {
        event: UserEvent {
            start_time: start,
            end_time: start + duration,
            ..event.clone()
        },
        rule,
        exclusions,
    })
}

/// Expands a series into its concrete occurrences, in chronological order.
pub fn expand_series(series: &SeriesDefinition) -> Vec<Occurrence> {
    let event = &series.event;
    let rule = &series.rule;
    let duration = event.end_time - event.start_time;
    let anchor = event.start_time.date();
    let Some(until) = rule.until else {
        return Vec::new();
    };

    let anchor_day = anchor.weekday().num_days_from_sunday() as i64;
    let mut offsets: Vec<i64> = rule
        .days_of_week
        .iter()
        .map(|d| (*d as i64 - anchor_day).rem_euclid(7))
        .collect();
    offsets.sort_unstable();
    offsets.dedup();

    let step = Duration::weeks(rule.interval.max(1) as i64);
    let excluded: BTreeSet<&NaiveDateTime> = series.exclusions.iter().collect();
    let mut occurrences = Vec::new();
    let mut generated: u32 = 0;
    let mut block_start = anchor;

    'blocks: while block_start <= until {
        for offset in &offsets {
            let day = block_start + Duration::days(*offset);
            if day > until {
                break 'blocks;
            }
            if rule.count.is_some_and(|count| generated >= count) {
                break 'blocks;
            }
            generated += 1;

            let start = day.and_time(event.start_time.time());
            if excluded.contains(&start) {
                continue;
            }
            occurrences.push(Occurrence {
                event_id: event.id.clone(),
                title: event.title.clone(),
                start,
                end: start + duration,
                location: event.location.clone(),
            });
        }
        block_start += step;
    }

    occurrences
}

/// A one-shot event as its single occurrence.
pub fn single_occurrence(event: &UserEvent) -> Occurrence {
    Occurrence {
        event_id: event.id.clone(),
        title: event.title.clone(),
        start: event.start_time,
        end: event.end_time,
        location: event.location.clone(),
    }
}
