//! Plain-text rendering of a table view.

use std::fmt::Write;

use pms_grid_lib::TableView;
use pms_grid_lib::model::TableRow;
use pms_grid_lib::selection::HeaderCheckbox;
use unicode_width::UnicodeWidthStr;

const GAP: &str = "  ";

fn checkbox(state: HeaderCheckbox) -> &'static str {
    match state {
        HeaderCheckbox::Unchecked => "[ ]",
        HeaderCheckbox::Indeterminate => "[-]",
        HeaderCheckbox::Checked => "[x]",
    }
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{}{}", cell, " ".repeat(fill))
}

/// Renders the visible columns of the current page as aligned text,
/// followed by a `page X/Y (N rows)` footer.
pub fn render_table<R: TableRow>(view: &TableView<R>) -> String {
    let headers: Vec<String> = view
        .visible_columns
        .iter()
        .map(|c| {
            if c.label.is_empty() {
                c.key.clone()
            } else {
                c.label.clone()
            }
        })
        .collect();

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(view.rows.len() + 1);
    let mut header = vec![checkbox(view.header_checkbox).to_string()];
    header.extend(headers);
    lines.push(header);

    for row in &view.rows {
        let selected = view.selected_ids.contains(&row.id());
        let mut line = vec![if selected { "[x]" } else { "[ ]" }.to_string()];
        line.extend(
            view.visible_columns
                .iter()
                .map(|c| row.field_text(&c.key).unwrap_or_default()),
        );
        lines.push(line);
    }

    let columns = lines[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|i| lines.iter().map(|l| l[i].width()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in &lines {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| pad(cell, width))
            .collect();
        let _ = writeln!(out, "{}", cells.join(GAP).trim_end());
    }

    if view.rows.is_empty() {
        let _ = writeln!(out, "(no rows)");
    }
    let _ = write!(
        out,
        "page {}/{} ({} rows)",
        view.current_page, view.total_pages, view.total_count
    );
    if !view.selected_ids.is_empty() {
        let _ = write!(out, ", {} selected", view.selected_ids.len());
    }
    if view.loading {
        let _ = write!(out, ", loading");
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pms_grid_lib::column::Column;
    use pms_grid_lib::filter::FilterState;
    use pms_grid_lib::model::Record;

    fn view(rows: Vec<Record>, selected: Vec<String>, header: HeaderCheckbox) -> TableView<Record> {
        TableView {
            total_count: 23,
            rows,
            visible_columns: vec![Column::new("name", "Name"), Column::new("unit", "Unit")],
            current_page: 3,
            per_page: 10,
            per_page_options: vec![10, 25],
            total_pages: 3,
            selected_ids: selected,
            header_checkbox: header,
            query: String::new(),
            filters: FilterState::new(),
            sort: None,
            loading: false,
            last_error: None,
        }
    }

    #[test]
    fn test_columns_are_aligned() {
        let rows = vec![
            Record::new().set("id", "1").set("name", "Bob").set("unit", "A-1"),
            Record::new().set("id", "2").set("name", "Alexandra").set("unit", "B-12"),
        ];
        let text = render_table(&view(rows, vec!["2".to_string()], HeaderCheckbox::Indeterminate));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[-]  Name       Unit");
        assert_eq!(lines[1], "[ ]  Bob        A-1");
        assert_eq!(lines[2], "[x]  Alexandra  B-12");
        assert_eq!(lines[3], "page 3/3 (23 rows), 1 selected");
    }

    #[test]
    fn test_missing_fields_render_blank() {
        let rows = vec![Record::new().set("id", "1").set("name", "Bob")];
        let text = render_table(&view(rows, vec![], HeaderCheckbox::Unchecked));
        assert_eq!(text.lines().nth(1), Some("[ ]  Bob"));
    }

    #[test]
    fn test_empty_page() {
        let text = render_table(&view(vec![], vec![], HeaderCheckbox::Unchecked));
        assert!(text.contains("(no rows)"));
        assert!(text.ends_with("page 3/3 (23 rows)\n"));
    }
}
