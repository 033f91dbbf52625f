//! Calendar feed assembly: recurring classes, one-shot events and academic
//! period blocks combined into one feed, rendered as iCalendar.

mod ics;

pub use ics::{local_to_utc, render_calendar};

use crate::academic::{AcademicCalendarCache, AcademicYearStructure, Language, PeriodType, Semester};
use crate::config::{OrarConfig, DEFAULT_CALENDAR_URL};
use crate::error::OrarError;
use crate::fetch::DocumentFetcher;
use crate::schedule::{
    events_from_user_timetable, expand_series, resolve_semester_start, single_occurrence, synthesize_series,
    Occurrence, SeriesContext, SeriesDefinition, UserEvent, UserTimetable,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;
use tracing::{info, warn};

/// Options for building a feed
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub language: Language,
    pub is_terminal_year: bool,
    pub include_vacations: bool,
    pub include_exam_periods: bool,
    /// Overrides the end of every recurring series
    pub until: Option<NaiveDate>,
    pub calendar_url: String,
    pub timezone: Tz,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            language: Language::RoEn,
            is_terminal_year: false,
            include_vacations: true,
            include_exam_periods: true,
            until: None,
            calendar_url: DEFAULT_CALENDAR_URL.to_string(),
            timezone: chrono_tz::Europe::Bucharest,
        }
    }
}

impl From<&OrarConfig> for FeedOptions {
    fn from(config: &OrarConfig) -> Self {
        Self {
            calendar_url: config.calendar_url.clone(),
            timezone: config.tz(),
            ..Self::default()
        }
    }
}

/// A whole-day block taken from the academic calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBlock {
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
    pub kind: PeriodType,
    pub description: String,
}

/// An assembled feed, ready to render.
#[derive(Debug, Clone)]
pub struct Feed {
    pub name: String,
    pub generated_at: DateTime<Utc>,
    pub series: Vec<SeriesDefinition>,
    pub single_events: Vec<UserEvent>,
    pub period_blocks: Vec<PeriodBlock>,
}

impl Feed {
    /// Every concrete class meeting in the feed.
    ///
    /// Series are expanded one after the other; only occurrences of the same
    /// series are guaranteed to be in chronological order.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.series
            .iter()
            .flat_map(expand_series)
            .chain(self.single_events.iter().map(single_occurrence))
            .collect()
    }
}

/// Vacation and exam-style periods that apply to the cohort, deduplicated.
pub fn period_blocks(structure: &AcademicYearStructure, options: &FeedOptions) -> Vec<PeriodBlock> {
    let mut seen = HashSet::new();
    structure
        .semesters
        .iter()
        .filter(|s| s.applies_to(options.is_terminal_year))
        .flat_map(|s| s.periods.iter())
        .filter(|p| {
            (options.include_vacations && p.kind == PeriodType::Vacation)
                || (options.include_exam_periods && p.kind.is_exam_like())
        })
        .filter(|p| seen.insert((p.start_date, p.end_date, p.kind)))
        .map(|p| PeriodBlock {
            start: p.start_date,
            end: p.end_date,
            kind: p.kind,
            description: p.description.clone(),
        })
        .collect()
}

/// Combines events and the academic calendar into a feed.
///
/// Recurring events that resolve to no series (e.g. starting on a holiday)
/// are left out; one-shot events are kept as they are.
pub fn assemble(
    name: &str,
    events: &[UserEvent],
    context: &SeriesContext,
    options: &FeedOptions,
    generated_at: DateTime<Utc>,
) -> Feed {
    let context = SeriesContext {
        until: options.until.or(context.until),
        ..*context
    };

    let mut series = Vec::new();
    let mut single_events = Vec::new();
    for event in events {
        if event.is_recurring {
            if let Some(definition) = synthesize_series(event, &context) {
                series.push(definition);
            }
        } else {
            single_events.push(event.clone());
        }
    }

    let period_blocks = context
        .structure
        .map(|structure| period_blocks(structure, options))
        .unwrap_or_default();

    Feed {
        name: name.to_string(),
        generated_at,
        series,
        single_events,
        period_blocks,
    }
}

/// Builds the feed of a user timetable against an optional academic calendar.
///
/// A calendar for a different academic year than the timetable's is ignored.
///
/// # Returns
/// * `Ok(Feed)` - Assembled feed
/// * `Err(OrarError::InvalidTimetable)` - If the semester or academic year can't be read
pub fn build_feed(
    timetable: &UserTimetable,
    options: &FeedOptions,
    structure: Option<&AcademicYearStructure>,
    generated_at: DateTime<Utc>,
) -> Result<Feed, OrarError> {
    let semester = Semester::from_number(timetable.semester).ok_or_else(|| OrarError::InvalidTimetable {
        message: format!("semester must be 1 or 2, got {}", timetable.semester),
    })?;
    let first_year = timetable.first_year().ok_or_else(|| OrarError::InvalidTimetable {
        message: format!("unreadable academic year {}", timetable.academic_year),
    })?;

    let structure = structure.filter(|s| {
        let same_year = starting_year(&s.academic_year) == Some(first_year);
        if !same_year {
            warn!(
                timetable = %timetable.academic_year,
                calendar = %s.academic_year,
                "Academic calendar is for another year, building feed without exclusions"
            );
        }
        same_year
    });

    let semester_start = resolve_semester_start(
        structure,
        semester,
        options.is_terminal_year,
        timetable.semester_start,
        first_year,
    );
    let events = events_from_user_timetable(timetable, semester_start);
    let context = SeriesContext {
        semester,
        semester_start,
        is_terminal_year: options.is_terminal_year,
        structure,
        until: options.until,
        semester_end: timetable.semester_end,
    };

    Ok(assemble(&timetable.name, &events, &context, options, generated_at))
}

/// First calendar year of "2025-2026" or "2025/2026".
fn starting_year(academic_year: &str) -> Option<i32> {
    academic_year.split(['-', '/']).next()?.trim().parse().ok()
}

/// Looks up the academic calendar, treating any failure as "unavailable".
pub async fn resolve_structure(
    cache: &AcademicCalendarCache,
    fetcher: &DocumentFetcher,
    options: &FeedOptions,
) -> Option<AcademicYearStructure> {
    match cache
        .get_or_refresh(options.language, fetcher, &options.calendar_url)
        .await
    {
        Ok(structure) => Some(structure),
        Err(e) => {
            warn!(
                language = %options.language,
                error = %e,
                "Academic calendar unavailable, building feed without exclusions"
            );
            None
        }
    }
}

/// Generates the iCalendar feed for a user timetable.
///
/// The academic calendar is optional: if it can't be obtained the feed is
/// still produced, without exclusions or period blocks.
///
/// # Arguments
/// * `timetable` - The user's timetable
/// * `options` - Cohort, filters and series end
/// * `cache` - Process-wide academic calendar cache
/// * `fetcher` - Used on a cache miss
///
/// # Returns
/// * `Ok(String)` - iCalendar document
/// * `Err(OrarError::InvalidTimetable)` - If the timetable itself is unusable
pub async fn generate_feed(
    timetable: &UserTimetable,
    options: &FeedOptions,
    cache: &AcademicCalendarCache,
    fetcher: &DocumentFetcher,
) -> Result<String, OrarError> {
    let structure = resolve_structure(cache, fetcher, options).await;
    let feed = build_feed(timetable, options, structure.as_ref(), Utc::now())?;

    info!(
        timetable = %timetable.id,
        series = feed.series.len(),
        single_events = feed.single_events.len(),
        period_blocks = feed.period_blocks.len(),
        calendar = structure.is_some(),
        "Generated feed"
    );

    Ok(render_calendar(&feed, options.timezone))
}
