//! Daily profile table for the AGP dashboard.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per calendar
//! date, plus an overall row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use agp_core::formatting;
use agp_runtime::payload::{DailyRow, ReportPayload};

use crate::themes::Theme;

/// The slice of `rows` that fits in a table `height` cells tall, from `offset`.
pub fn visible_rows(rows: &[DailyRow], offset: usize, height: u16) -> &[DailyRow] {
    // Border top/bottom, header, and the overall row.
    let capacity = usize::from(height).saturating_sub(4);
    let start = offset.min(rows.len());
    let end = (start + capacity).min(rows.len());
    &rows[start..end]
}

/// Render the daily table into `area`, starting at row `offset`.
pub fn render_daily_table(
    frame: &mut Frame,
    area: Rect,
    payload: &ReportPayload,
    offset: usize,
    theme: &Theme,
) {
    let header_cells = ["Date", "Min", "Max", "Mean", "Readings"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let shown = visible_rows(&payload.daily, offset, area.height);
    let mut all_rows: Vec<Row> = shown
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if (offset + i) % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.date.clone()),
                Cell::from(row.min.clone()),
                Cell::from(row.max.clone()),
                Cell::from(row.mean.clone()),
                Cell::from(formatting::format_count(row.count)),
            ])
            .style(style)
        })
        .collect();

    let days = payload.daily.len();
    all_rows.push(
        Row::new(vec![
            Cell::from("OVERALL"),
            Cell::from(format!("{days} {}", if days == 1 { "day" } else { "days" })),
            Cell::from(""),
            Cell::from(
                payload
                    .cards
                    .iter()
                    .find(|c| c.title == "Mean Glucose")
                    .map(|c| c.value.clone())
                    .unwrap_or_default(),
            ),
            Cell::from(formatting::format_count(payload.metadata.readings)),
        ])
        .style(theme.bold),
    );

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(10),
    ];

    let title = if shown.is_empty() {
        " Daily Profiles ".to_string()
    } else {
        format!(
            " Daily Profiles ({}-{} of {}) ",
            offset + 1,
            offset + shown.len(),
            days
        )
    };

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary_view::tests::sample_payload;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rows(n: usize) -> Vec<DailyRow> {
        (0..n)
            .map(|i| DailyRow {
                date: format!("2024-01-{:02}", i + 1),
                min: "70.0".into(),
                max: "180.0".into(),
                mean: "125.0".into(),
                count: 96,
            })
            .collect()
    }

    // ── visible_rows ──────────────────────────────────────────────────────────

    #[test]
    fn test_visible_rows_fits_height() {
        let all = rows(30);
        assert_eq!(visible_rows(&all, 0, 14).len(), 10);
        assert_eq!(visible_rows(&all, 25, 14).len(), 5);
        assert_eq!(visible_rows(&all, 25, 14)[0].date, "2024-01-26");
    }

    #[test]
    fn test_visible_rows_offset_past_end() {
        let all = rows(3);
        assert!(visible_rows(&all, 10, 20).is_empty());
        assert!(visible_rows(&all, 0, 2).is_empty());
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_daily_table_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let payload = sample_payload();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_daily_table(frame, area, &payload, 0, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_daily_table_scrolled_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 6)).unwrap();
        let mut payload = sample_payload();
        payload.daily = rows(40);
        let theme = Theme::light();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_daily_table(frame, area, &payload, 38, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_daily_table_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let mut payload = sample_payload();
        payload.daily.clear();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_daily_table(frame, area, &payload, 0, &theme);
            })
            .unwrap();
    }
}
