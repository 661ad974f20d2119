//! Records tab: an editable table backed by the record store.
//!
//! [`RecordsEditor`] owns the working copy of the rows, the cursor, and the
//! in-progress cell edit. Saving and loading are delegated back to the caller
//! through [`EditorEvent`].

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use agp_runtime::data::store::Record;

use crate::themes::Theme;

const MIN_COLUMN_WIDTH: usize = 4;
const MAX_COLUMN_WIDTH: usize = 40;

// ── Column ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Age,
    Email,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Id, Column::Name, Column::Age, Column::Email];

    pub fn title(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Age => "age",
            Column::Email => "email",
        }
    }

    pub fn value(&self, record: &Record) -> String {
        match self {
            Column::Id => record.id.to_string(),
            Column::Name => record.name.clone(),
            Column::Age => record.age.to_string(),
            Column::Email => record.email.clone(),
        }
    }

    /// Write `text` into this column of `record`.
    pub fn apply(&self, record: &mut Record, text: &str) -> Result<(), String> {
        let parse_int = |text: &str| {
            text.trim()
                .parse::<i64>()
                .map_err(|_| format!("{} must be a whole number, got '{}'", self.title(), text))
        };
        match self {
            Column::Id => record.id = parse_int(text)?,
            Column::Name => record.name = text.to_string(),
            Column::Age => record.age = parse_int(text)?,
            Column::Email => record.email = text.to_string(),
        }
        Ok(())
    }
}

// ── EditorEvent ───────────────────────────────────────────────────────────────

/// What the editor did with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Not an editor key; the caller may handle it.
    Ignored,
    Handled,
    Info(String),
    Error(String),
    /// Persist the current rows.
    Save,
    /// Replace the current rows from the store.
    Load,
}

// ── RecordsEditor ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordsEditor {
    records: Vec<Record>,
    row: usize,
    col: usize,
    editing: Option<String>,
}

impl RecordsEditor {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            row: 0,
            col: 0,
            editing: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replace every row, dropping any edit in progress.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.editing = None;
        self.row = self.row.min(self.records.len().saturating_sub(1));
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    fn column(&self) -> Column {
        Column::ALL[self.col]
    }

    // ── Key handling ──────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorEvent {
        if self.editing.is_some() {
            return self.handle_edit_key(key);
        }

        match key.code {
            KeyCode::Up => {
                self.row = self.row.saturating_sub(1);
                EditorEvent::Handled
            }
            KeyCode::Down => {
                if self.row + 1 < self.records.len() {
                    self.row += 1;
                }
                EditorEvent::Handled
            }
            KeyCode::Left => {
                self.col = self.col.saturating_sub(1);
                EditorEvent::Handled
            }
            KeyCode::Right => {
                if self.col + 1 < Column::ALL.len() {
                    self.col += 1;
                }
                EditorEvent::Handled
            }
            KeyCode::Enter => match self.records.get(self.row) {
                Some(record) => {
                    self.editing = Some(self.column().value(record));
                    EditorEvent::Handled
                }
                None => EditorEvent::Info("No row to edit; press 'a' to add one".to_string()),
            },
            KeyCode::Char('a') => {
                let next_id = self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
                self.records.push(Record::new(next_id, "", 0, ""));
                self.row = self.records.len() - 1;
                EditorEvent::Info(format!("Added row {next_id}"))
            }
            KeyCode::Char('d') => {
                if self.row < self.records.len() {
                    let removed = self.records.remove(self.row);
                    self.row = self.row.min(self.records.len().saturating_sub(1));
                    EditorEvent::Info(format!("Deleted row {}", removed.id))
                } else {
                    EditorEvent::Handled
                }
            }
            KeyCode::Char('s') => EditorEvent::Save,
            KeyCode::Char('l') => EditorEvent::Load,
            _ => EditorEvent::Ignored,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> EditorEvent {
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                EditorEvent::Info("Edit cancelled".to_string())
            }
            KeyCode::Enter => {
                let text = self.editing.clone().unwrap_or_default();
                let column = self.column();
                let Some(record) = self.records.get_mut(self.row) else {
                    self.editing = None;
                    return EditorEvent::Handled;
                };
                match column.apply(record, &text) {
                    Ok(()) => {
                        self.editing = None;
                        EditorEvent::Handled
                    }
                    Err(message) => EditorEvent::Error(message),
                }
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.editing.as_mut() {
                    buf.pop();
                }
                EditorEvent::Handled
            }
            KeyCode::Char(c) => {
                if let Some(buf) = self.editing.as_mut() {
                    buf.push(c);
                }
                EditorEvent::Handled
            }
            _ => EditorEvent::Handled,
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Display width for each column, fitted to its widest value.
pub fn column_widths(records: &[Record]) -> [usize; 4] {
    let mut widths = [0usize; 4];
    for (i, column) in Column::ALL.iter().enumerate() {
        let widest = records
            .iter()
            .map(|r| UnicodeWidthStr::width(column.value(r).as_str()))
            .chain(std::iter::once(column.title().len()))
            .max()
            .unwrap_or(0);
        widths[i] = widest.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
    }
    widths
}

pub fn render_records_view(frame: &mut Frame, area: Rect, editor: &RecordsEditor, theme: &Theme) {
    let header = Row::new(
        Column::ALL
            .iter()
            .map(|c| Cell::from(c.title()).style(theme.table_header)),
    )
    .height(1);

    let (sel_row, sel_col) = editor.cursor();
    let rows: Vec<Row> = editor
        .records()
        .iter()
        .enumerate()
        .map(|(r, record)| {
            let cells = Column::ALL.iter().enumerate().map(|(c, column)| {
                let selected = r == sel_row && c == sel_col;
                match (selected, editor.edit_buffer()) {
                    (true, Some(buf)) => {
                        Cell::from(Line::from(Span::styled(format!("{buf}_"), theme.cell_editing)))
                    }
                    (true, None) => Cell::from(column.value(record)).style(theme.table_selected),
                    _ => Cell::from(column.value(record)),
                }
            });
            let style = if r % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths = column_widths(editor.records())
        .map(|w| Constraint::Length(u16::try_from(w + 2).unwrap_or(u16::MAX)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" Records ({}) ", editor.records().len())),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agp_runtime::data::store::seed_records;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(editor: &mut RecordsEditor, text: &str) {
        for c in text.chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    #[test]
    fn test_cursor_moves_within_bounds() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Up));
        editor.handle_key(key(KeyCode::Left));
        assert_eq!(editor.cursor(), (0, 0));

        for _ in 0..10 {
            editor.handle_key(key(KeyCode::Down));
            editor.handle_key(key(KeyCode::Right));
        }
        assert_eq!(editor.cursor(), (2, 3));
    }

    // ── Editing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_edit_name_commit() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Right));
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.edit_buffer(), Some("Alice"));

        for _ in 0.."Alice".len() {
            editor.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut editor, "Ada");
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), EditorEvent::Handled);

        assert!(!editor.is_editing());
        assert_eq!(editor.records()[0].name, "Ada");
    }

    #[test]
    fn test_edit_cancel_keeps_value() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Enter));
        type_text(&mut editor, "99");
        let event = editor.handle_key(key(KeyCode::Esc));
        assert!(matches!(event, EditorEvent::Info(_)));
        assert_eq!(editor.records()[0].id, 1);
    }

    #[test]
    fn test_edit_age_rejects_text() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Right));
        editor.handle_key(key(KeyCode::Right));
        editor.handle_key(key(KeyCode::Enter));
        type_text(&mut editor, "x");

        let event = editor.handle_key(key(KeyCode::Enter));
        assert!(matches!(event, EditorEvent::Error(ref m) if m.contains("age")));
        assert!(editor.is_editing(), "a rejected value keeps the edit open");
        assert_eq!(editor.records()[0].age, 30);
    }

    #[test]
    fn test_letters_are_text_while_editing() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Right));
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.handle_key(key(KeyCode::Char('s'))), EditorEvent::Handled);
        assert_eq!(editor.edit_buffer(), Some("Alices"));
    }

    // ── Rows ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_add_row_uses_next_id() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Char('a')));
        assert_eq!(editor.records().len(), 4);
        assert_eq!(editor.records()[3].id, 4);
        assert_eq!(editor.cursor().0, 3);
    }

    #[test]
    fn test_add_row_to_empty_table() {
        let mut editor = RecordsEditor::new(Vec::new());
        editor.handle_key(key(KeyCode::Char('a')));
        assert_eq!(editor.records()[0].id, 1);
    }

    #[test]
    fn test_delete_last_row_moves_cursor_up() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Char('d')));
        assert_eq!(editor.records().len(), 2);
        assert_eq!(editor.cursor().0, 1);
    }

    #[test]
    fn test_delete_on_empty_table() {
        let mut editor = RecordsEditor::new(Vec::new());
        assert_eq!(editor.handle_key(key(KeyCode::Char('d'))), EditorEvent::Handled);
        assert!(matches!(
            editor.handle_key(key(KeyCode::Enter)),
            EditorEvent::Info(_)
        ));
    }

    #[test]
    fn test_save_load_and_unknown_keys() {
        let mut editor = RecordsEditor::new(seed_records());
        assert_eq!(editor.handle_key(key(KeyCode::Char('s'))), EditorEvent::Save);
        assert_eq!(editor.handle_key(key(KeyCode::Char('l'))), EditorEvent::Load);
        assert_eq!(editor.handle_key(key(KeyCode::Char('q'))), EditorEvent::Ignored);
        assert_eq!(editor.handle_key(key(KeyCode::Tab)), EditorEvent::Ignored);
    }

    #[test]
    fn test_set_records_clamps_cursor() {
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Down));
        editor.set_records(vec![Record::new(1, "Solo", 1, "s@x")]);
        assert_eq!(editor.cursor().0, 0);
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_column_widths_fit_content() {
        let widths = column_widths(&seed_records());
        assert_eq!(widths[0], MIN_COLUMN_WIDTH);
        assert_eq!(widths[1], "Charlie".len());
        assert_eq!(widths[3], "charlie@example.com".len());
    }

    #[test]
    fn test_column_widths_count_wide_chars() {
        let widths = column_widths(&[Record::new(1, "日本語の名前", 1, "")]);
        assert_eq!(widths[1], 12);
    }

    #[test]
    fn test_render_records_view_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let mut editor = RecordsEditor::new(seed_records());
        editor.handle_key(key(KeyCode::Enter));
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_records_view(frame, area, &editor, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_records_view_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        let editor = RecordsEditor::new(Vec::new());
        let theme = Theme::classic();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_records_view(frame, area, &editor, &theme);
            })
            .unwrap();
    }
}
