//! Small table-walking helpers shared by the page parsers.

use scraper::ElementRef;

/// Rows that belong to `table` itself, not to tables nested inside it.
pub fn direct_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// `td`/`th` children of a row.
pub fn row_cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

/// Text of an element, text nodes joined by spaces so `<br>` keeps words apart.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// True if the element sits somewhere inside a `<table>`.
pub fn inside_table(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_direct_rows_skip_nested_tables() {
        let html = Html::parse_fragment(
            "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr><tr><th>a</th><td>b<br>c</td></tr></table>",
        );
        let selector = Selector::parse("table").unwrap();
        let outer = html.select(&selector).next().unwrap();
        let rows = direct_rows(outer);
        assert_eq!(rows.len(), 2);

        let cells = row_cells(rows[1]);
        assert_eq!(cells.len(), 2);
        assert_eq!(element_text(&cells[1]), "b c");
    }

    #[test]
    fn test_inside_table() {
        let html = Html::parse_fragment("<p>out</p><table><tr><td><p>in</p></td></tr></table>");
        let selector = Selector::parse("p").unwrap();
        let flags: Vec<bool> = html.select(&selector).map(|p| inside_table(&p)).collect();
        assert_eq!(flags, vec![false, true]);
    }
}
