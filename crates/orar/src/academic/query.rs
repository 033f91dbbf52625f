//! Date lookups over a parsed academic year structure.

use super::types::*;
use chrono::NaiveDate;

/// True if `date` falls inside a vacation or free-day period of any semester.
pub fn is_non_teaching_day(date: NaiveDate, structure: &AcademicYearStructure) -> bool {
    structure
        .semesters
        .iter()
        .flat_map(|s| s.periods.iter())
        .any(|p| p.kind == PeriodType::Vacation && p.contains(date))
}

/// The period active on `date` for the given cohort.
///
/// Semester II blocks reserved for the other cohort (terminal vs
/// non-terminal) are ignored.
pub fn get_current_period(
    date: NaiveDate,
    structure: &AcademicYearStructure,
    is_terminal_year: bool,
) -> Option<&AcademicPeriod> {
    structure
        .semesters
        .iter()
        .filter(|s| s.applies_to(is_terminal_year))
        .flat_map(|s| s.periods.iter())
        .find(|p| p.contains(date))
}

/// The semester block that applies to the cohort.
///
/// For semester II a block marked for the cohort wins over an unmarked one.
pub fn semester_for(
    structure: &AcademicYearStructure,
    semester: Semester,
    is_terminal_year: bool,
) -> Option<&SemesterStructure> {
    let wanted = if is_terminal_year {
        YearType::Terminal
    } else {
        YearType::NonTerminal
    };
    let candidates = || structure.semesters.iter().filter(move |s| s.semester == semester);

    candidates()
        .find(|s| s.year_type == Some(wanted))
        .or_else(|| candidates().find(|s| s.year_type.is_none()))
}

/// Vacation periods of every semester, in page order.
pub fn vacation_periods(structure: &AcademicYearStructure) -> impl Iterator<Item = &AcademicPeriod> {
    structure
        .semesters
        .iter()
        .flat_map(|s| s.periods.iter())
        .filter(|p| p.kind == PeriodType::Vacation)
}
