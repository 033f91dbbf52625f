/// Types for the academic year structure
use crate::timetable::fold_key;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of period listed in the academic year structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Teaching,
    Vacation,
    Exams,
    Retakes,
    Practice,
    Preparation,
    Graduation,
}

/// Folded keywords for each period type, checked in this order.
const PERIOD_KEYWORDS: &[(PeriodType, &[&str])] = &[
    (
        PeriodType::Teaching,
        &["activitate didactica", "activitati didactice", "teaching"],
    ),
    (
        PeriodType::Vacation,
        &["vacant", "zi libera", "zile libere", "holiday"],
    ),
    (
        PeriodType::Exams,
        &[
            "sesiune examene",
            "sesiunea examene",
            "sesiune de examene",
            "sesiunea de examene",
            "exam session",
        ],
    ),
    (PeriodType::Retakes, &["restant", "retake"]),
    (PeriodType::Practice, &["practica", "practice"]),
    (
        PeriodType::Preparation,
        &["pregatirea examen", "pregatire examen"],
    ),
    (
        PeriodType::Graduation,
        &["licenta", "disertatie", "graduation"],
    ),
];

impl PeriodType {
    /// Classifies a period description. Unknown descriptions count as teaching.
    pub fn classify(description: &str) -> PeriodType {
        let folded = fold_key(description);
        PERIOD_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| folded.contains(k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(PeriodType::Teaching)
    }

    /// Periods rendered as exam-style blocks in feeds.
    pub fn is_exam_like(&self) -> bool {
        matches!(
            self,
            PeriodType::Exams | PeriodType::Retakes | PeriodType::Practice | PeriodType::Graduation
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Teaching => "teaching",
            PeriodType::Vacation => "vacation",
            PeriodType::Exams => "exams",
            PeriodType::Retakes => "retakes",
            PeriodType::Practice => "practice",
            PeriodType::Preparation => "preparation",
            PeriodType::Graduation => "graduation",
        }
    }
}

/// A dated block of the academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicPeriod {
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: PeriodType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AcademicPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Semester {
    I,
    II,
}

impl Semester {
    pub fn from_number(n: u8) -> Option<Semester> {
        match n {
            1 => Some(Semester::I),
            2 => Some(Semester::II),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Semester::I => 1,
            Semester::II => 2,
        }
    }
}

/// Which semester II calendar a block applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YearType {
    Terminal,
    NonTerminal,
}

/// One semester block of the structure table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterStructure {
    pub semester: Semester,
    /// Only set for semester II
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_type: Option<YearType>,
    pub periods: Vec<AcademicPeriod>,
}

impl SemesterStructure {
    /// True if this block applies to the given cohort.
    pub fn applies_to(&self, is_terminal_year: bool) -> bool {
        match self.year_type {
            None => true,
            Some(YearType::Terminal) => is_terminal_year,
            Some(YearType::NonTerminal) => !is_terminal_year,
        }
    }

    /// First day of the earliest teaching period.
    pub fn first_teaching_day(&self) -> Option<NaiveDate> {
        self.periods
            .iter()
            .filter(|p| p.kind == PeriodType::Teaching)
            .map(|p| p.start_date)
            .min()
    }

    /// End of the last teaching period, walking periods backwards.
    pub fn teaching_end(&self) -> Option<NaiveDate> {
        self.periods
            .iter()
            .rev()
            .find(|p| p.kind == PeriodType::Teaching)
            .map(|p| p.end_date)
    }
}

/// Language line of study a structure table is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Romanian and English lines
    #[serde(rename = "ro-en")]
    RoEn,
    /// Hungarian and German lines
    #[serde(rename = "hu-de")]
    HuDe,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::RoEn => "ro-en",
            Language::HuDe => "hu-de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ro-en" | "ro" | "en" => Ok(Language::RoEn),
            "hu-de" | "hu" | "de" => Ok(Language::HuDe),
            other => Err(format!("unknown language line {}", other)),
        }
    }
}

/// Full academic year structure for one language line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYearStructure {
    /// e.g. "2025-2026"
    pub academic_year: String,
    pub language: Language,
    pub semesters: Vec<SemesterStructure>,
    pub last_scraped: DateTime<Utc>,
}
