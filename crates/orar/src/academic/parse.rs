//! Parsing of the academic year structure page.
//!
//! The page holds one table per language line. Each table is a sequence of
//! semester header rows ("SEMESTRUL I", "SEMESTRUL II - ani terminali", ...)
//! followed by data rows made of a date range and a description.

use super::types::*;
use crate::error::OrarError;
use crate::html::{direct_rows, element_text, inside_table, row_cells};
use crate::timetable::{clean_cell, fold_key};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static SECTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, p, strong, b, table").unwrap());
static DATE_RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})\s*[-–—]\s*(\d{1,2})\.(\d{1,2})\.(\d{4})").unwrap()
});
static SINGLE_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").unwrap());
static SEMESTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"semestrul\s+(i{1,2})\b").unwrap());

const RO_EN_MARKERS: &[&str] = &["romana", "engleza", "romanian", "english"];
const HU_DE_MARKERS: &[&str] = &["maghiara", "germana", "hungarian", "german", "magyar", "deutsch"];

/// Parses the structure page into one `AcademicYearStructure` per language line.
///
/// # Arguments
/// * `html` - Full page content
/// * `scraped_at` - Timestamp stored as `last_scraped`
///
/// # Returns
/// * `Ok(Vec<AcademicYearStructure>)` - At least one structure
/// * `Err(OrarError::CalendarScrape)` - If no structure table could be read
pub fn parse_academic_calendar(
    html: &str,
    scraped_at: DateTime<Utc>,
) -> Result<Vec<AcademicYearStructure>, OrarError> {
    let document = Html::parse_document(html);
    let mut sections: Vec<(Language, Vec<SemesterStructure>)> = Vec::new();
    let mut unlabelled: Vec<Vec<SemesterStructure>> = Vec::new();
    let mut pending: Option<Language> = None;

    for element in document.select(&SECTION_SELECTOR) {
        if element.value().name() == "table" {
            if inside_table(&element) {
                continue;
            }
            let semesters = parse_structure_table(element);
            if semesters.is_empty() {
                continue;
            }
            match pending.take() {
                Some(language) if !sections.iter().any(|(l, _)| *l == language) => {
                    sections.push((language, semesters))
                }
                _ => unlabelled.push(semesters),
            }
        } else if !inside_table(&element) {
            if let Some(language) = language_marker(&element_text(&element)) {
                pending = Some(language);
            }
        }
    }

    if sections.is_empty() {
        debug!("No language headings found, assigning structure tables by position");
        for (language, semesters) in [Language::RoEn, Language::HuDe].into_iter().zip(unlabelled) {
            sections.push((language, semesters));
        }
    }

    let structures: Vec<AcademicYearStructure> = sections
        .into_iter()
        .filter_map(|(language, semesters)| {
            let academic_year = academic_year_of(&semesters)?;
            Some(AcademicYearStructure {
                academic_year,
                language,
                semesters,
                last_scraped: scraped_at,
            })
        })
        .collect();

    if structures.is_empty() {
        return Err(OrarError::CalendarScrape {
            message: "no academic year structure table found".to_string(),
        });
    }

    info!(
        structures = structures.len(),
        academic_year = %structures[0].academic_year,
        "Parsed academic calendar"
    );
    Ok(structures)
}

/// Detects which language line a heading announces.
fn language_marker(text: &str) -> Option<Language> {
    let folded = fold_key(text);
    let ro = RO_EN_MARKERS.iter().any(|m| folded.contains(m));
    let hu = HU_DE_MARKERS.iter().any(|m| folded.contains(m));
    match (ro, hu) {
        (true, false) => Some(Language::RoEn),
        (false, true) => Some(Language::HuDe),
        _ => None,
    }
}

/// Reads the semester blocks of one table. Returns nothing for unrelated tables.
fn parse_structure_table(table: ElementRef) -> Vec<SemesterStructure> {
    let mut semesters: Vec<SemesterStructure> = Vec::new();

    for row in direct_rows(table) {
        let cells = row_cells(row);
        let Some(first) = cells.first() else {
            continue;
        };
        let texts: Vec<String> = cells.iter().map(|c| clean_cell(&element_text(c))).collect();
        let has_dates = texts.iter().any(|t| SINGLE_DATE_REGEX.is_match(t));

        let first_folded = fold_key(&texts[0]);
        if first_folded.contains("semestrul") && (first.value().name() == "th" || !has_dates) {
            match semester_header(&fold_key(&texts.join(" "))) {
                Some(block) => semesters.push(block),
                None => warn!(text = %texts[0], "Unrecognized semester header"),
            }
            continue;
        }

        let Some(current) = semesters.last_mut() else {
            if has_dates {
                debug!(text = %texts.join(" | "), "Skipping period row before any semester header");
            }
            continue;
        };

        if let Some(period) = parse_period_row(&texts) {
            current.periods.push(period);
        }
    }

    semesters
}

/// Builds an empty semester block from a header row's folded text.
fn semester_header(folded: &str) -> Option<SemesterStructure> {
    let caps = SEMESTER_REGEX.captures(folded)?;
    let semester = match &caps[1] {
        "i" => Semester::I,
        _ => Semester::II,
    };

    let year_type = if semester == Semester::II {
        if folded.contains("neterminal") {
            Some(YearType::NonTerminal)
        } else if folded.contains("terminal") {
            Some(YearType::Terminal)
        } else {
            None
        }
    } else {
        None
    };

    Some(SemesterStructure {
        semester,
        year_type,
        periods: Vec::new(),
    })
}

/// Reads a date range and description out of a data row.
fn parse_period_row(texts: &[String]) -> Option<AcademicPeriod> {
    let (date_index, start_date, end_date) = texts.iter().enumerate().find_map(|(i, t)| {
        let (start, end) = parse_date_range(t)?;
        Some((i, start, end))
    })?;

    if start_date > end_date {
        warn!(
            start = %start_date,
            end = %end_date,
            "Skipping period that ends before it starts"
        );
        return None;
    }

    let mut rest = texts
        .iter()
        .enumerate()
        .filter(|(i, t)| *i != date_index && !t.is_empty())
        .map(|(_, t)| t.clone());
    let description = rest.next().unwrap_or_default();
    let notes = rest.collect::<Vec<_>>().join("; ");

    Some(AcademicPeriod {
        start_date,
        end_date,
        kind: PeriodType::classify(&description),
        description,
        notes: (!notes.is_empty()).then_some(notes),
    })
}

/// Parses `DD.MM.YYYY - DD.MM.YYYY` (any dash) or a single `DD.MM.YYYY`.
pub fn parse_date_range(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    if let Some(caps) = DATE_RANGE_REGEX.captures(text) {
        let start = ymd(&caps[3], &caps[2], &caps[1])?;
        let end = ymd(&caps[6], &caps[5], &caps[4])?;
        return Some((start, end));
    }
    let caps = SINGLE_DATE_REGEX.captures(text)?;
    let day = ymd(&caps[3], &caps[2], &caps[1])?;
    Some((day, day))
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// "2025-2026" for a structure whose first period starts in autumn 2025.
fn academic_year_of(semesters: &[SemesterStructure]) -> Option<String> {
    let first = semesters
        .iter()
        .flat_map(|s| s.periods.iter())
        .map(|p| p.start_date)
        .min()?;
    let start_year = if first.month() >= 8 {
        first.year()
    } else {
        first.year() - 1
    };
    Some(format!("{}-{}", start_year, start_year + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::academic::fixtures::STRUCTURE_PAGE;

    fn scraped_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-10-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parses_both_language_lines() {
        let structures = parse_academic_calendar(STRUCTURE_PAGE, scraped_at()).unwrap();
        assert_eq!(structures.len(), 2);

        let ro = &structures[0];
        assert_eq!(ro.language, Language::RoEn);
        assert_eq!(ro.academic_year, "2025-2026");
        assert_eq!(ro.semesters.len(), 3);
        assert_eq!(ro.semesters[0].semester, Semester::I);
        assert_eq!(ro.semesters[0].periods.len(), 6);
        assert_eq!(ro.semesters[1].year_type, Some(YearType::NonTerminal));
        assert_eq!(ro.semesters[2].year_type, Some(YearType::Terminal));

        let hu = &structures[1];
        assert_eq!(hu.language, Language::HuDe);
        assert_eq!(hu.semesters[0].periods.len(), 3);
        assert_eq!(hu.last_scraped, scraped_at());
    }

    #[test]
    fn test_period_rows() {
        let structures = parse_academic_calendar(STRUCTURE_PAGE, scraped_at()).unwrap();
        let periods = &structures[0].semesters[0].periods;

        assert_eq!(periods[0].kind, PeriodType::Teaching);
        assert_eq!(periods[0].notes.as_deref(), Some("12 săptămâni"));
        assert_eq!(periods[1].kind, PeriodType::Vacation);
        assert_eq!(periods[1].start_date, NaiveDate::from_ymd_opt(2025, 12, 22).unwrap());
        assert_eq!(periods[1].end_date, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
        assert_eq!(periods[1].notes, None);
        assert_eq!(periods[3].kind, PeriodType::Exams);
        assert_eq!(periods[5].kind, PeriodType::Retakes);

        let terminal = &structures[0].semesters[2].periods;
        assert_eq!(terminal.last().unwrap().kind, PeriodType::Graduation);
    }

    #[test]
    fn test_tables_without_headings_are_assigned_by_position() {
        let html = STRUCTURE_PAGE
            .replace("Linia de studiu română și engleză", "Tabel 1")
            .replace("Linia de studiu maghiară și germană", "Tabel 2");
        let structures = parse_academic_calendar(&html, scraped_at()).unwrap();
        assert_eq!(structures[0].language, Language::RoEn);
        assert_eq!(structures[1].language, Language::HuDe);
    }

    #[test]
    fn test_page_without_structure_is_error() {
        let err = parse_academic_calendar("<html><body><table><tr><td>x</td></tr></table></body></html>", scraped_at())
            .unwrap_err();
        assert!(matches!(err, OrarError::CalendarScrape { .. }));
    }

    #[test]
    fn test_parse_date_range_dashes() {
        let expected = (
            NaiveDate::from_ymd_opt(2025, 9, 29).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 21).unwrap(),
        );
        assert_eq!(parse_date_range("29.09.2025 - 21.12.2025"), Some(expected));
        assert_eq!(parse_date_range("29.09.2025–21.12.2025"), Some(expected));
        assert_eq!(parse_date_range("29.09.2025 — 21.12.2025"), Some(expected));
        assert_eq!(parse_date_range("31.02.2025"), None);
        assert_eq!(parse_date_range("fără dată"), None);
    }
}
