//! Timetable table discovery and row projection.

use super::header::{score_header, HeaderMatch};
use super::normalize::EntryBuilder;
use super::types::{GroupTable, TableContext, TimetableEntry};
use crate::html::{direct_rows, element_text, row_cells};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

// Static selectors for parsing - compiled once
static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static SECTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, table").unwrap());
static GROUP_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*\d{2,}\S*").unwrap());

/// Returns every table whose first row scores as a timetable header.
///
/// Tables are numbered by their position among all tables of the page, so
/// layout tables that get dropped still count.
pub fn extract_tables(document: &Html, default_group: &str) -> Vec<TableContext> {
    document
        .select(&TABLE_SELECTOR)
        .enumerate()
        .filter_map(|(index, table)| parse_table(index, table, default_group))
        .collect()
}

/// Union of the entries of every qualifying table, in page order.
pub fn extract_entries(document: &Html, default_group: &str) -> Vec<TimetableEntry> {
    extract_tables(document, default_group)
        .into_iter()
        .flat_map(|table| table.entries)
        .collect()
}

/// Qualifying tables labelled with the closest heading above them.
///
/// Only headings that contain a number of at least two digits (e.g.
/// "Grupa 211") count; a heading is used for every table until the next one.
pub fn extract_group_tables(document: &Html, default_group: &str) -> Vec<GroupTable> {
    let mut groups = Vec::new();
    let mut current_name: Option<String> = None;
    let mut table_index = 0;

    for element in document.select(&SECTION_SELECTOR) {
        if element.value().name() != "table" {
            let text = element_text(&element);
            if let Some(m) = GROUP_NAME_REGEX.find(&text) {
                current_name = Some(m.as_str().to_string());
            }
            continue;
        }

        if let Some(table) = parse_table(table_index, element, default_group) {
            groups.push(GroupTable {
                group_name: current_name.clone(),
                entries: table.entries,
            });
        }
        table_index += 1;
    }

    groups
}

/// Scores the first row of `table` and, if it qualifies, projects every later row.
fn parse_table(index: usize, table: ElementRef, default_group: &str) -> Option<TableContext> {
    let rows = direct_rows(table);
    let (header_row, data_rows) = rows.split_first()?;

    // layout table wrapping the real one
    if header_row.select(&TABLE_SELECTOR).next().is_some() {
        return None;
    }

    let header_cells: Vec<String> = row_cells(*header_row).iter().map(element_text).collect();
    let header = score_header(&header_cells);
    if !header.is_timetable() {
        debug!(
            table = index,
            score = header.score,
            cells = header_cells.len(),
            "Skipping non-timetable table"
        );
        return None;
    }

    let entries: Vec<TimetableEntry> = data_rows
        .iter()
        .filter_map(|row| project_row(*row, &header, default_group))
        .collect();

    debug!(table = index, score = header.score, entries = entries.len(), "Parsed timetable table");

    Some(TableContext {
        index,
        header,
        entries,
    })
}

/// Projects a data row through the header mapping.
fn project_row(row: ElementRef, header: &HeaderMatch, default_group: &str) -> Option<TimetableEntry> {
    let mut builder = EntryBuilder::new();
    for (cell, field) in row_cells(row).iter().zip(&header.columns) {
        if let Some(field) = field {
            builder.set(*field, &element_text(cell));
        }
    }
    builder.build(default_group)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<tr><th>Ziua</th><th>Orele</th><th>Frecventa</th><th>Sala</th>\
        <th>Formatia</th><th>Tipul</th><th>Disciplina</th><th>Cadrul didactic</th></tr>";

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds)
    }

    #[test]
    fn test_multiple_tables_are_all_returned() {
        let html = page(&format!(
            "<h1>Grupa 211</h1><table>{}{}{}</table>\
             <h1>Grupa 212</h1><table>{}{}</table>",
            HEADER,
            row(&["Luni", "8-10", "", "C310", "211", "Curs", "Algebra", "Prof. A"]),
            row(&["Marti", "10-12", "sapt. 1", "L001", "211/1", "Laborator", "Baze de date", "Asist. B"]),
            HEADER,
            row(&["Joi", "12-14", "", "C335", "212", "Seminar", "Geometrie", "Lect. C"]),
        ));

        let tables = extract_tables(&html, "I2");
        assert_eq!(tables.len(), 2);
        let merged = extract_entries(&html, "I2");
        let total: usize = tables.iter().map(|t| t.entries.len()).sum();
        assert_eq!(merged.len(), total);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].group, "211/1");
        assert_eq!(merged[1].frequency, "sapt. 1");
    }

    #[test]
    fn test_layout_tables_are_dropped() {
        let html = page(&format!(
            "<table><tr><td>Col1</td><td>Col2</td></tr></table><table>{}{}</table>",
            HEADER,
            row(&["Luni", "8-10", "", "C310", "211", "Curs", "Algebra", "Prof. A"]),
        ));
        let tables = extract_tables(&html, "I2");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].index, 1);
    }

    #[test]
    fn test_missing_group_column_uses_default() {
        let html = page(&format!(
            "<table>{}{}{}</table>",
            row(&["Ziua", "Ore", "Disciplina", "Sala", "Tip"]),
            row(&["Vineri", "14-16", "Analiza", "A2", "Curs"]),
            row(&["&nbsp;", "", "", "", ""]),
        ));
        let entries = extract_entries(&html, "INFO3");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].group, "INFO3");
        assert_eq!(entries[0].teacher, "");
    }

    #[test]
    fn test_teacher_line_breaks_become_separated() {
        let html = page(&format!(
            "<table>{}{}</table>",
            HEADER,
            row(&["Luni", "8-10", "", "C310", "211", "Curs", "Algebra", "Prof. A,<br>,Lect. B"]),
        ));
        let entries = extract_entries(&html, "I2");
        assert_eq!(entries[0].teacher, "Prof. A, Lect. B");
    }

    #[test]
    fn test_nested_table_header_is_not_counted_twice() {
        let inner = format!(
            "<table>{}{}</table>",
            HEADER,
            row(&["Luni", "8-10", "", "C310", "211", "Curs", "Algebra", "Prof. A"])
        );
        let html = page(&format!(
            "<table><tr><td>{}</td><td>x</td><td>y</td></tr></table>",
            inner
        ));
        let tables = extract_tables(&html, "I2");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].entries.len(), 1);
    }

    #[test]
    fn test_group_tables_use_preceding_heading() {
        let html = page(&format!(
            "<table>{}{}</table><h2>Anul 2</h2><h1>Grupa 221</h1><table>{}{}</table>",
            HEADER,
            row(&["Luni", "8-10", "", "C310", "", "Curs", "Algebra", "Prof. A"]),
            HEADER,
            row(&["Joi", "12-14", "", "C335", "221", "Seminar", "Geometrie", "Lect. C"]),
        ));
        let groups = extract_group_tables(&html, "I2");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_name, None);
        assert_eq!(groups[0].entries[0].group, "");
        assert_eq!(groups[1].group_name.as_deref(), Some("221"));
    }
}
