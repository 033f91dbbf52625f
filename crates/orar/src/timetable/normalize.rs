//! Cell cleanup and row building.

use super::header::Field;
use super::types::TimetableEntry;

/// Cleans cell text for storage.
///
/// Non-breaking spaces become spaces, whitespace runs collapse, and the
/// cedilla forms of ș/ț (common in older pages) become comma-below.
/// Applying it twice gives the same result.
pub fn clean_cell(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
            continue;
        }
        let ch = match ch {
            'ş' => 'ș',
            'Ş' => 'Ș',
            'ţ' => 'ț',
            'Ţ' => 'Ț',
            c => c,
        };
        out.push(ch);
        prev_space = false;
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Folds text into a matching key: cleaned, lowercase, without diacritics.
pub fn fold_key(s: &str) -> String {
    clean_cell(s)
        .to_lowercase()
        .chars()
        .map(strip_diacritic)
        .collect()
}

fn strip_diacritic(c: char) -> char {
    match c {
        'ă' | 'â' | 'á' | 'à' | 'ä' => 'a',
        'î' | 'í' | 'ì' => 'i',
        'ș' | 'ş' => 's',
        'ț' | 'ţ' => 't',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'ó' | 'ò' | 'ö' | 'ő' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'ű' | 'û' => 'u',
        c => c,
    }
}

/// Cleans a teacher cell: collapses whitespace and repeated commas.
///
/// `"Prof. A ,, Lect.  B,"` becomes `"Prof. A, Lect. B"`.
pub fn clean_teacher(s: &str) -> String {
    clean_cell(s)
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Re-applies cell cleanup to every field of an entry.
pub fn normalize_entry(entry: &TimetableEntry) -> TimetableEntry {
    TimetableEntry {
        day: clean_cell(&entry.day),
        hours: clean_cell(&entry.hours),
        frequency: clean_cell(&entry.frequency),
        room: clean_cell(&entry.room),
        group: clean_cell(&entry.group),
        kind: clean_cell(&entry.kind),
        subject: clean_cell(&entry.subject),
        teacher: clean_teacher(&entry.teacher),
    }
}

/// Accumulates the cells of one row.
///
/// Only fields that were actually present in the row are recorded, so the
/// builder can tell an empty group cell from a table without a group column.
#[derive(Debug, Default)]
pub struct EntryBuilder {
    day: Option<String>,
    hours: Option<String>,
    frequency: Option<String>,
    room: Option<String>,
    group: Option<String>,
    kind: Option<String>,
    subject: Option<String>,
    teacher: Option<String>,
}

impl EntryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the raw text of a cell. Later values for the same field are ignored.
    pub fn set(&mut self, field: Field, raw: &str) -> &mut Self {
        let slot = match field {
            Field::Day => &mut self.day,
            Field::Hours => &mut self.hours,
            Field::Frequency => &mut self.frequency,
            Field::Room => &mut self.room,
            Field::Group => &mut self.group,
            Field::Type => &mut self.kind,
            Field::Subject => &mut self.subject,
            Field::Teacher => &mut self.teacher,
        };
        if slot.is_none() {
            *slot = Some(match field {
                Field::Teacher => clean_teacher(raw),
                _ => clean_cell(raw),
            });
        }
        self
    }

    /// Emits the entry, or `None` for spacer rows (no day, subject or hours).
    ///
    /// `default_group` is only used when no group cell was recorded.
    pub fn build(self, default_group: &str) -> Option<TimetableEntry> {
        let day = self.day.unwrap_or_default();
        let hours = self.hours.unwrap_or_default();
        let subject = self.subject.unwrap_or_default();
        if day.is_empty() && hours.is_empty() && subject.is_empty() {
            return None;
        }

        Some(TimetableEntry {
            day,
            hours,
            frequency: self.frequency.unwrap_or_default(),
            room: self.room.unwrap_or_default(),
            group: self.group.unwrap_or_else(|| default_group.to_string()),
            kind: self.kind.unwrap_or_default(),
            subject,
            teacher: self.teacher.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  Luni\u{a0}\n "), "Luni");
        assert_eq!(clean_cell("Programare   în\tPython"), "Programare în Python");
        assert_eq!(clean_cell("Şcoala ţării"), "Școala țării");
        assert_eq!(clean_cell("\u{a0}"), "");
    }

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("Frecvența"), "frecventa");
        assert_eq!(fold_key("  SĂPT.  1 "), "sapt. 1");
        assert_eq!(fold_key("Vacanţă"), "vacanta");
    }

    #[test]
    fn test_clean_teacher() {
        assert_eq!(clean_teacher("Prof. A ,, Lect.  B,"), "Prof. A, Lect. B");
        assert_eq!(clean_teacher(" , "), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let entry = TimetableEntry {
            day: " Marţi ".to_string(),
            hours: "8-10".to_string(),
            frequency: "sapt.\u{a0}1".to_string(),
            room: "  C310 ".to_string(),
            group: "211/1".to_string(),
            kind: "Laborator".to_string(),
            subject: "Baze  de date".to_string(),
            teacher: "Conf. X,,Asist. Y".to_string(),
        };
        let once = normalize_entry(&entry);
        let twice = normalize_entry(&once);
        assert_eq!(once, twice);
        assert_eq!(once.day, "Marți");
        assert_eq!(once.teacher, "Conf. X, Asist. Y");
    }

    #[test]
    fn test_builder_skips_spacer_rows() {
        let mut builder = EntryBuilder::new();
        builder.set(Field::Room, "C310").set(Field::Day, " ");
        assert!(builder.build("INFO3").is_none());
    }

    #[test]
    fn test_builder_defaults_missing_group_only() {
        let mut without = EntryBuilder::new();
        without.set(Field::Day, "Luni");
        assert_eq!(without.build("INFO3").unwrap().group, "INFO3");

        let mut explicit = EntryBuilder::new();
        explicit.set(Field::Day, "Luni").set(Field::Group, "211/1");
        assert_eq!(explicit.build("INFO3").unwrap().group, "211/1");

        let mut blank = EntryBuilder::new();
        blank.set(Field::Day, "Luni").set(Field::Group, "\u{a0}");
        assert_eq!(blank.build("INFO3").unwrap().group, "");
    }
}
