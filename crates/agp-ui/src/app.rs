//! Main application state and TUI event loop for the AGP dashboard.
//!
//! [`App`] owns the theme, the active tab, the [`ReportSession`] and the last
//! report payload. Each key press that needs data runs exactly one session
//! pass; nothing refreshes in the background.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};

use agp_runtime::payload::ReportPayload;
use agp_runtime::session::{ReportSession, Response, Trigger};

use crate::agp_chart::render_agp_chart;
use crate::components::header::Header;
use crate::records_view::{render_records_view, EditorEvent, RecordsEditor};
use crate::summary_view::{render_no_report, render_summary_view};
use crate::table_view::render_daily_table;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which screen the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Summary,
    Agp,
    Daily,
    Records,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Summary, Tab::Agp, Tab::Daily, Tab::Records];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Summary => "1 Summary",
            Tab::Agp => "2 AGP",
            Tab::Daily => "3 Daily",
            Tab::Records => "4 Records",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Summary => 0,
            Tab::Agp => 1,
            Tab::Daily => 2,
            Tab::Records => 3,
        }
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// Message shown in the bottom status line until the next one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub text: String,
}

const KEY_HINTS: &str = "Tab/1-4 switch | r reload | q quit";
const RECORD_HINTS: &str = "arrows move | Enter edit | Esc cancel | a add | d delete | s save | l load";

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the AGP dashboard.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    session: ReportSession,
    source: Option<PathBuf>,
    payload: Option<ReportPayload>,
    load_error: Option<String>,
    editor: RecordsEditor,
    daily_offset: usize,
    status: Option<Status>,
}

impl App {
    /// Build the app and, when `source` is given, load it immediately.
    pub fn new(theme_name: &str, session: ReportSession, source: Option<PathBuf>) -> Self {
        let editor = RecordsEditor::new(session.records().to_vec());
        let tab = if source.is_some() {
            Tab::Summary
        } else {
            Tab::Records
        };
        let mut app = Self {
            theme: Theme::from_name(theme_name),
            tab,
            should_quit: false,
            session,
            source,
            payload: None,
            load_error: None,
            editor,
            daily_offset: 0,
            status: None,
        };
        if app.source.is_some() {
            app.reload();
        }
        app
    }

    pub fn payload(&self) -> Option<&ReportPayload> {
        self.payload.as_ref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn editor(&self) -> &RecordsEditor {
        &self.editor
    }

    fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(Status {
            level,
            text: text.into(),
        });
    }

    // ── Session passes ────────────────────────────────────────────────────────

    /// Re-ingest the input file through the session.
    pub fn reload(&mut self) {
        let Some(path) = self.source.clone() else {
            self.set_status(StatusLevel::Info, "No input file to reload");
            return;
        };

        match self.session.handle(Trigger::Load(path.clone())) {
            Ok(Response::Report { payload, .. }) => {
                let readings = payload.metadata.readings;
                self.payload = Some(*payload);
                self.load_error = None;
                self.daily_offset = 0;
                self.set_status(
                    StatusLevel::Success,
                    format!("Loaded {} readings from {}", readings, path.display()),
                );
            }
            Ok(other) => {
                tracing::warn!(?other, "unexpected response to load");
            }
            Err(e) => {
                self.payload = None;
                self.load_error = Some(e.to_string());
                self.set_status(StatusLevel::Error, e.to_string());
            }
        }
    }

    fn save_records(&mut self) {
        let records = self.editor.records().to_vec();
        match self.session.handle(Trigger::SaveRecords(records)) {
            Ok(Response::RecordsSaved(n)) => {
                self.set_status(StatusLevel::Success, format!("Saved {n} records"));
            }
            Ok(other) => tracing::warn!(?other, "unexpected response to save"),
            Err(e) => self.set_status(StatusLevel::Error, e.to_string()),
        }
    }

    fn load_records(&mut self) {
        match self.session.handle(Trigger::LoadRecords) {
            Ok(Response::Records(rows)) => {
                let n = rows.len();
                self.editor.set_records(rows);
                self.set_status(StatusLevel::Success, format!("Loaded {n} records"));
            }
            Ok(other) => tracing::warn!(?other, "unexpected response to load records"),
            Err(e) => self.set_status(StatusLevel::Error, e.to_string()),
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char('c') = key.code {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                self.should_quit = true;
                return;
            }
        }

        if self.tab == Tab::Records {
            match self.editor.handle_key(key) {
                EditorEvent::Ignored => {}
                EditorEvent::Handled => return,
                EditorEvent::Info(text) => return self.set_status(StatusLevel::Info, text),
                EditorEvent::Error(text) => return self.set_status(StatusLevel::Error, text),
                EditorEvent::Save => return self.save_records(),
                EditorEvent::Load => return self.load_records(),
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Down | KeyCode::PageDown if self.tab == Tab::Daily => {
                let step = if key.code == KeyCode::PageDown { 10 } else { 1 };
                let days = self.payload.as_ref().map_or(0, |p| p.daily.len());
                self.daily_offset = (self.daily_offset + step).min(days.saturating_sub(1));
            }
            KeyCode::Up | KeyCode::PageUp if self.tab == Tab::Daily => {
                let step = if key.code == KeyCode::PageUp { 10 } else { 1 };
                self.daily_offset = self.daily_offset.saturating_sub(step);
            }
            _ => {}
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q`, or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout and yields to the
    /// runtime between polls so an outer `select!` can still observe signals.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result: io::Result<()> = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, tabs_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let source = self
            .payload
            .as_ref()
            .and_then(|p| p.metadata.source.as_deref());
        let readings = self.payload.as_ref().map(|p| p.metadata.readings);
        let header = Header::new(source, readings, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(Span::styled(" | ", self.theme.separator));
        frame.render_widget(tabs, tabs_area);

        self.render_body(frame, body_area);
        self.render_status(frame, status_area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        if self.tab == Tab::Records {
            render_records_view(frame, area, &self.editor, &self.theme);
            return;
        }

        let Some(payload) = &self.payload else {
            render_no_report(frame, area, self.load_error.as_deref(), &self.theme);
            return;
        };
        match self.tab {
            Tab::Summary => render_summary_view(frame, area, payload, &self.theme),
            Tab::Agp => render_agp_chart(frame, area, payload, &self.theme),
            Tab::Daily => render_daily_table(frame, area, payload, self.daily_offset, &self.theme),
            Tab::Records => {}
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(status) => {
                let style = match status.level {
                    StatusLevel::Info => self.theme.info,
                    StatusLevel::Success => self.theme.success,
                    StatusLevel::Error => self.theme.error,
                };
                Line::from(Span::styled(status.text.as_str(), style))
            }
            None => {
                let hints = if self.tab == Tab::Records {
                    RECORD_HINTS
                } else {
                    KEY_HINTS
                };
                Line::from(Span::styled(hints, self.theme.dim))
            }
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agp_runtime::data::analysis::AnalysisConfig;
    use agp_runtime::data::store::{seed_records, RecordStore};
    use ratatui::backend::TestBackend;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn session() -> ReportSession {
        ReportSession::with_store(
            AnalysisConfig::default(),
            RecordStore::open_in_memory().unwrap(),
        )
    }

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("export.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Device Timestamp,Historic Glucose mg/dL").unwrap();
        write!(file, "{body}").unwrap();
        path
    }

    const SCENARIO: &str = "2024-01-01 08:00,70\n2024-01-01 08:00,180\n2024-01-02 08:00,125\n";

    fn render_all_tabs(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        for tab in Tab::ALL {
            app.tab = tab;
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }

    // ── Tab ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Summary.next(), Tab::Agp);
        assert_eq!(Tab::Records.next(), Tab::Summary);
        assert_eq!(Tab::Summary.prev(), Tab::Records);
        for tab in Tab::ALL {
            assert_eq!(Tab::ALL[tab.index()], tab);
        }
    }

    // ── App::new ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_without_file_opens_records() {
        let app = App::new("dark", session(), None);
        assert_eq!(app.tab, Tab::Records);
        assert!(app.payload().is_none());
        assert_eq!(app.editor().records(), seed_records().as_slice());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_app_with_file_loads_report() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), SCENARIO);
        let app = App::new("light", session(), Some(path));

        assert_eq!(app.tab, Tab::Summary);
        let payload = app.payload().unwrap();
        assert_eq!(payload.metadata.readings, 3);
        assert_eq!(app.status().unwrap().level, StatusLevel::Success);
    }

    #[test]
    fn test_app_with_bad_file_shows_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "yesterday,100\n");
        let mut app = App::new("dark", session(), Some(path));

        assert!(app.payload().is_none());
        let status = app.status().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.text.contains("row 2"), "{}", status.text);
        render_all_tabs(&mut app);
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        let mut app = App::new("dark", session(), None);
        app.tab = Tab::Summary;
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = App::new("dark", session(), None);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit, "Ctrl+C quits even on the records tab");
    }

    #[test]
    fn test_q_on_records_tab_quits() {
        let mut app = App::new("dark", session(), None);
        assert_eq!(app.tab, Tab::Records);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_switching_keys() {
        let mut app = App::new("dark", session(), None);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.tab, Tab::Summary);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Agp);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.tab, Tab::Summary);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.tab, Tab::Daily);
    }

    #[test]
    fn test_editing_swallows_global_keys() {
        let mut app = App::new("dark", session(), None);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('q')));
        app.handle_key(key(KeyCode::Char('1')));
        assert!(!app.should_quit);
        assert_eq!(app.tab, Tab::Records);
        assert_eq!(app.editor().edit_buffer(), Some("Aliceq1"));
    }

    #[test]
    fn test_reload_without_file() {
        let mut app = App::new("dark", session(), None);
        app.tab = Tab::Summary;
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.status().unwrap().level, StatusLevel::Info);
    }

    #[test]
    fn test_reload_picks_up_file_changes() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), SCENARIO);
        let mut app = App::new("dark", session(), Some(path.clone()));
        assert_eq!(app.payload().unwrap().metadata.readings, 3);

        write_csv(dir.path(), "2024-01-03 09:00,99\n");
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.payload().unwrap().metadata.readings, 1);
    }

    #[test]
    fn test_save_and_load_records_through_session() {
        let mut app = App::new("dark", session(), None);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.status().unwrap().text, "Saved 2 records");

        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.editor().records().len(), 3);

        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.editor().records().len(), 2);
        assert_eq!(app.status().unwrap().text, "Loaded 2 records");
    }

    #[test]
    fn test_daily_scroll_is_clamped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), SCENARIO);
        let mut app = App::new("dark", session(), Some(path));
        app.handle_key(key(KeyCode::Char('3')));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.daily_offset, 1);
        app.handle_key(key(KeyCode::PageUp));
        assert_eq!(app.daily_offset, 0);
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_every_tab_with_report() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), SCENARIO);
        let mut app = App::new("dark", session(), Some(path));
        render_all_tabs(&mut app);
    }

    #[test]
    fn test_render_every_tab_without_report() {
        let mut app = App::new("classic", session(), None);
        render_all_tabs(&mut app);
    }

    #[test]
    fn test_render_shows_header_and_status() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), SCENARIO);
        let app = App::new("dark", session(), Some(path));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect()
        };
        assert!(row(0).contains("AMBULATORY GLUCOSE PROFILE"));
        assert!(row(2).contains("export.csv"));
        assert!(row(29).contains("Loaded 3 readings"));
    }
}
