//! Header vocabulary and column mapping.
//!
//! Scoring is a pure function of the header texts: each cell is folded
//! (lowercase, no diacritics, single spaces) and matched against a synonym
//! table. New synonyms only need a new line in `HEADER_VOCABULARY`.

use super::normalize::fold_key;
use serde::{Deserialize, Serialize};

/// Minimum number of distinct fields a header row has to name.
pub const MIN_HEADER_SCORE: usize = 3;

/// Minimum number of cells in a header row.
pub const MIN_HEADER_CELLS: usize = 3;

/// A column of a timetable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Day,
    Hours,
    Frequency,
    Room,
    Group,
    Type,
    Subject,
    Teacher,
}

/// Folded synonyms for every field, checked in this order.
pub const HEADER_VOCABULARY: &[(Field, &[&str])] = &[
    (Field::Day, &["ziua", "zi", "zile"]),
    (Field::Hours, &["orele", "ore", "ora", "interval orar"]),
    (Field::Frequency, &["frecventa", "frecv", "saptamana"]),
    (Field::Room, &["sala", "locul", "sala/locul"]),
    (Field::Group, &["formatia", "formatie", "grupa"]),
    (Field::Type, &["tipul", "tip"]),
    (Field::Subject, &["disciplina", "materia", "activitatea"]),
    (
        Field::Teacher,
        &["cadrul didactic", "cadru didactic", "profesor", "titular"],
    ),
];

/// Result of scoring a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Number of distinct fields recognized
    pub score: usize,
    /// Field for every header cell, by position
    pub columns: Vec<Option<Field>>,
}

impl HeaderMatch {
    /// True if the row looks like a timetable header.
    pub fn is_timetable(&self) -> bool {
        self.columns.len() >= MIN_HEADER_CELLS && self.score >= MIN_HEADER_SCORE
    }

    /// Column index holding `field`, if any.
    pub fn position_of(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| *c == Some(field))
    }
}

/// Scores a header row and maps each position to a field.
///
/// When two cells name the same field, the first one keeps it.
pub fn score_header<S: AsRef<str>>(cells: &[S]) -> HeaderMatch {
    let mut columns = Vec::with_capacity(cells.len());
    let mut seen: Vec<Field> = Vec::new();

    for cell in cells {
        let field = match_field(&fold_key(cell.as_ref())).filter(|f| !seen.contains(f));
        if let Some(f) = field {
            seen.push(f);
        }
        columns.push(field);
    }

    HeaderMatch {
        score: seen.len(),
        columns,
    }
}

/// Maps one folded header text to a field.
pub fn match_field(folded: &str) -> Option<Field> {
    let cell_tokens = tokens(folded);
    if cell_tokens.is_empty() {
        return None;
    }

    HEADER_VOCABULARY
        .iter()
        .find(|(_, synonyms)| {
            synonyms.iter().any(|syn| {
                let syn_tokens = tokens(syn);
                cell_tokens
                    .windows(syn_tokens.len())
                    .any(|w| w == syn_tokens.as_slice())
            })
        })
        .map(|(field, _)| *field)
}

fn tokens(s: &str) -> Vec<&str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_partial_romanian_header() {
        let header = score_header(&["Ziua", "Ore", "Disciplina", "Sala", "Tip"]);
        assert_eq!(header.score, 5);
        assert!(header.is_timetable());
        assert_eq!(header.position_of(Field::Subject), Some(2));
        assert_eq!(header.position_of(Field::Type), Some(4));
    }

    #[test]
    fn test_rejects_layout_header() {
        let header = score_header(&["Col1", "Col2"]);
        assert_eq!(header.score, 0);
        assert!(!header.is_timetable());
    }

    #[test]
    fn test_full_header_with_diacritics() {
        let header = score_header(&[
            "Ziua",
            "Orele",
            "Frecvența",
            "Sala",
            "Formația",
            "Tipul",
            "Disciplina",
            "Cadrul\u{a0}didactic",
        ]);
        assert_eq!(header.score, 8);
        assert_eq!(header.position_of(Field::Teacher), Some(7));
        assert_eq!(header.position_of(Field::Group), Some(4));
    }

    #[test]
    fn test_duplicate_field_counted_once() {
        let header = score_header(&["Ora", "Orele", "Sala"]);
        assert_eq!(header.score, 2);
        assert_eq!(header.columns, vec![Some(Field::Hours), None, Some(Field::Room)]);
        assert!(!header.is_timetable());
    }

    #[test]
    fn test_short_synonym_needs_whole_word() {
        assert_eq!(match_field("ziua"), Some(Field::Day));
        assert_eq!(match_field("zilnic"), None);
        assert_eq!(match_field("sala/locul"), Some(Field::Room));
        assert_eq!(match_field(""), None);
    }
}
