/// Timetable page scraping module
mod extract;
mod header;
mod normalize;
mod source;
mod types;

pub use extract::{extract_entries, extract_group_tables, extract_tables};
pub use header::{match_field, score_header, Field, HeaderMatch, HEADER_VOCABULARY};
pub use normalize::{clean_cell, clean_teacher, fold_key, normalize_entry, EntryBuilder};
pub use source::extract_url_metadata;
pub use types::*;

use crate::error::OrarError;
use crate::fetch::{run_in_batches, BatchOptions, BatchReport, DocumentFetcher};
use scraper::Html;
use tracing::info;

/// Pages smaller than this are treated as "not published yet".
pub const EMPTY_PAGE_THRESHOLD: usize = 1000;

/// Parses a timetable page into a `Timetable`
///
/// Every qualifying table on the page contributes its rows; groups missing a
/// formation column get `{specialization}{yearOfStudy}` from the URL.
///
/// # Arguments
/// * `url` - URL the page was fetched from (used for metadata)
/// * `html` - Full page content
///
/// # Returns
/// * `Ok(Timetable)` - Parsed timetable
/// * `Err(OrarError::SourceFormat)` - If the URL does not follow the timetable pattern
/// * `Err(OrarError::EmptyDocument)` - If no table was found and the page is tiny
/// * `Err(OrarError::NoTimetableFound)` - If no table was found in a real page
pub fn parse_timetable(url: &str, html: &str) -> Result<Timetable, OrarError> {
    let metadata = extract_url_metadata(url)?;
    let document = Html::parse_document(html);

    let tables = extract_tables(&document, &metadata.default_group());
    if tables.is_empty() {
        return Err(no_table_error(html));
    }

    let entries: Vec<TimetableEntry> = tables.into_iter().flat_map(|t| t.entries).collect();
    info!(url = %url, entries = entries.len(), "Parsed timetable");

    Ok(Timetable::new(metadata, entries))
}

/// Parses a timetable page keeping one entry list per group heading.
pub fn parse_group_timetables(url: &str, html: &str) -> Result<Vec<GroupTable>, OrarError> {
    let metadata = extract_url_metadata(url)?;
    let document = Html::parse_document(html);

    let groups = extract_group_tables(&document, &metadata.default_group());
    if groups.is_empty() {
        return Err(no_table_error(html));
    }
    Ok(groups)
}

fn no_table_error(html: &str) -> OrarError {
    if html.len() < EMPTY_PAGE_THRESHOLD {
        OrarError::EmptyDocument { bytes: html.len() }
    } else {
        OrarError::NoTimetableFound { bytes: html.len() }
    }
}

/// Fetches and parses one timetable page.
///
/// The URL is validated before any request is made.
pub async fn fetch_timetable(fetcher: &DocumentFetcher, url: &str) -> Result<Timetable, OrarError> {
    extract_url_metadata(url)?;
    let html = fetcher.fetch(url).await?;
    parse_timetable(url, &html)
}

/// Fetches and parses many timetable pages in bounded batches.
///
/// Failures (including benign empty pages) are collected per URL.
pub async fn fetch_timetables(
    fetcher: &DocumentFetcher,
    urls: &[String],
    options: BatchOptions,
) -> BatchReport<Timetable> {
    run_in_batches(urls, options, |url| async move { fetch_timetable(fetcher, &url).await }).await
}
