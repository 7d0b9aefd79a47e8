// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt::Write as _;

use crate::{EditCursor, FormField, StudentRecord};

pub const EMPTY_TABLE_MESSAGE: &str = "No students registered yet.";
pub const COLUMN_HEADERS: [&str; 5] = ["Name", "Student ID", "Email", "Contact", "Actions"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub index: usize,
    pub cells: [String; 4],
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Placeholder(&'static str),
    Record(RecordRow),
}

/// Display description of the record table, rebuilt from scratch on every
/// render. Cells carry raw text; markup hosts go through [`TableView::to_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn record_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, TableRow::Record(_)))
            .count()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<tbody>\n");
        for row in &self.rows {
            match row {
                TableRow::Placeholder(message) => {
                    let _ = writeln!(
                        html,
                        "  <tr class=\"empty-row\"><td colspan=\"{}\">{}</td></tr>",
                        COLUMN_HEADERS.len(),
                        escape_html(message)
                    );
                }
                TableRow::Record(record) => {
                    html.push_str("  <tr>");
                    for cell in &record.cells {
                        let _ = write!(html, "<td>{}</td>", escape_html(cell));
                    }
                    let _ = writeln!(
                        html,
                        "<td class=\"actions-cell\"><button class=\"btn-edit\" data-idx=\"{idx}\">Edit</button><button class=\"btn-delete\" data-idx=\"{idx}\">Delete</button></td></tr>",
                        idx = record.index
                    );
                }
            }
        }
        html.push_str("</tbody>\n");
        html
    }
}

pub fn render_table(records: &[StudentRecord], cursor: EditCursor) -> TableView {
    if records.is_empty() {
        return TableView {
            rows: vec![TableRow::Placeholder(EMPTY_TABLE_MESSAGE)],
        };
    }

    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            TableRow::Record(RecordRow {
                index,
                cells: FormField::ALL.map(|field| record.field(field).to_owned()),
                editing: cursor.index() == Some(index),
            })
        })
        .collect();
    TableView { rows }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether the table container needs a scroll affordance. Hosts call
/// [`LayoutState::apply`] after each render completes, once the visible
/// height is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutState {
    pub scrollable: bool,
}

impl LayoutState {
    /// Returns true when the scrollable state flipped.
    pub fn apply(&mut self, content_height: usize, visible_height: usize) -> bool {
        let scrollable = content_height > visible_height;
        let changed = scrollable != self.scrollable;
        self.scrollable = scrollable;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EMPTY_TABLE_MESSAGE, LayoutState, RecordRow, TableRow, escape_html, render_table,
    };
    use crate::{EditCursor, StudentRecord};

    fn records() -> Vec<StudentRecord> {
        vec![
            StudentRecord::new("John Doe", "101", "j@x.com", "1234567890"),
            StudentRecord::new("Ann Lee", "102", "a<b>@x.com", "5550001111"),
        ]
    }

    #[test]
    fn empty_list_renders_single_placeholder() {
        let view = render_table(&[], EditCursor::None);
        assert_eq!(view.rows, vec![TableRow::Placeholder(EMPTY_TABLE_MESSAGE)]);
        assert_eq!(view.record_count(), 0);
        assert_eq!(view.height(), 1);
    }

    #[test]
    fn rows_follow_list_order_and_mark_edited_row() {
        let view = render_table(&records(), EditCursor::Editing(1));
        assert_eq!(view.record_count(), 2);
        assert_eq!(
            view.rows[0],
            TableRow::Record(RecordRow {
                index: 0,
                cells: [
                    "John Doe".to_owned(),
                    "101".to_owned(),
                    "j@x.com".to_owned(),
                    "1234567890".to_owned(),
                ],
                editing: false,
            })
        );
        let TableRow::Record(second) = &view.rows[1] else {
            panic!("expected a record row");
        };
        assert_eq!(second.index, 1);
        assert!(second.editing);
    }

    #[test]
    fn rendering_is_idempotent() {
        let list = records();
        assert_eq!(
            render_table(&list, EditCursor::None),
            render_table(&list, EditCursor::None)
        );
    }

    #[test]
    fn escape_html_replaces_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn html_markup_escapes_cells_and_tags_actions_with_index() {
        let html = render_table(&records(), EditCursor::None).to_html();
        assert!(html.contains("<td>a&lt;b&gt;@x.com</td>"));
        assert!(!html.contains("a<b>@x.com"));
        assert!(html.contains("class=\"btn-edit\" data-idx=\"1\""));
        assert!(html.contains("class=\"btn-delete\" data-idx=\"0\""));
    }

    #[test]
    fn html_placeholder_spans_all_columns() {
        let html = render_table(&[], EditCursor::None).to_html();
        assert!(html.contains("colspan=\"5\""));
        assert!(html.contains(EMPTY_TABLE_MESSAGE));
    }

    #[test]
    fn layout_state_tracks_overflow() {
        let mut layout = LayoutState::default();
        assert!(!layout.apply(3, 10));
        assert!(!layout.scrollable);

        assert!(layout.apply(11, 10));
        assert!(layout.scrollable);
        assert!(!layout.apply(12, 10));

        assert!(layout.apply(10, 10));
        assert!(!layout.scrollable);
    }
}
