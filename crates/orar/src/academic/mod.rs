//! Academic calendar: the yearly structure of teaching, vacation and exam periods
//! published by the university, one table per language line.

mod cache;
#[cfg(test)]
pub(crate) mod fixtures;
mod parse;
mod query;
mod types;

pub use cache::{AcademicCalendarCache, Clock, ManualClock, SystemClock};
pub use parse::{parse_academic_calendar, parse_date_range};
pub use query::{get_current_period, is_non_teaching_day, semester_for, vacation_periods};
pub use types::*;

use crate::error::OrarError;
use crate::fetch::DocumentFetcher;
use chrono::Utc;
use tracing::info;

/// Fetches and parses the academic year structure page.
///
/// Any fetch or parse failure is reported as `OrarError::CalendarScrape`.
pub async fn scrape_academic_calendar(
    fetcher: &DocumentFetcher,
    url: &str,
) -> Result<Vec<AcademicYearStructure>, OrarError> {
    info!(url = %url, "Scraping academic calendar");

    let html = fetcher
        .fetch(url)
        .await
        .map_err(|e| OrarError::CalendarScrape {
            message: format!("fetch failed: {}", e),
        })?;

    parse_academic_calendar(&html, Utc::now())
}
