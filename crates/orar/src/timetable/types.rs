/// Types for parsed timetable data
use super::header::HeaderMatch;
use serde::{Deserialize, Serialize};

/// One row of a timetable table.
///
/// Every field holds the cleaned cell text as printed on the page. Missing
/// cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    /// Weekday name, e.g. "Luni"
    pub day: String,
    /// Raw interval, e.g. "8-10"
    pub hours: String,
    /// Raw week marker, e.g. "sapt. 1"
    pub frequency: String,
    pub room: String,
    /// Formation as printed, e.g. "211/1"
    pub group: String,
    /// "Curs", "Seminar", "Laborator", ...
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub teacher: String,
}

/// Metadata derived from a timetable URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMetadata {
    /// e.g. "2025-2026"
    pub academic_year: String,
    /// 1 or 2
    pub semester: u8,
    /// e.g. "INFO" for `INFO3.html`
    pub specialization: String,
    /// e.g. 3 for `INFO3.html`
    pub year_of_study: u8,
}

impl UrlMetadata {
    /// Group label used when a table has no formation column.
    pub fn default_group(&self) -> String {
        format!("{}{}", self.specialization, self.year_of_study)
    }
}

/// A parsed timetable page.
///
/// The metadata is fixed at construction; only the entries can be taken out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    #[serde(flatten)]
    metadata: UrlMetadata,
    entries: Vec<TimetableEntry>,
}

impl Timetable {
    pub fn new(metadata: UrlMetadata, entries: Vec<TimetableEntry>) -> Self {
        Self { metadata, entries }
    }

    pub fn metadata(&self) -> &UrlMetadata {
        &self.metadata
    }

    pub fn academic_year(&self) -> &str {
        &self.metadata.academic_year
    }

    pub fn semester(&self) -> u8 {
        self.metadata.semester
    }

    pub fn specialization(&self) -> &str {
        &self.metadata.specialization
    }

    pub fn year_of_study(&self) -> u8 {
        self.metadata.year_of_study
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TimetableEntry> {
        self.entries
    }
}

/// A qualifying table and the rows projected out of it.
#[derive(Debug, Clone)]
pub struct TableContext {
    /// Position of the table among all `<table>` elements of the page
    pub index: usize,
    pub header: HeaderMatch,
    pub entries: Vec<TimetableEntry>,
}

/// A qualifying table labelled by the heading printed above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTable {
    /// e.g. "211" for a table under "Grupa 211"; `None` if no heading precedes it
    pub group_name: Option<String>,
    pub entries: Vec<TimetableEntry>,
}
