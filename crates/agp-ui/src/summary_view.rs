//! Summary tab: headline cards and the time-in-range breakdown.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use agp_runtime::payload::ReportPayload;

use crate::components::range_bar::{RangeRow, StackedRangeBar};
use crate::themes::Theme;

/// Column width card titles are padded to.
const CARD_TITLE_WIDTH: usize = 16;

/// Build the summary lines (extracted for testability).
pub fn build_summary_lines<'a>(payload: &'a ReportPayload, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(payload.cards.len() + payload.segments.len() + 6);

    for card in &payload.cards {
        let pad = CARD_TITLE_WIDTH.saturating_sub(UnicodeWidthStr::width(card.title.as_str()));
        lines.push(Line::from(vec![
            Span::styled(format!("{}{}", card.title, " ".repeat(pad)), theme.label),
            Span::styled(card.value.as_str(), theme.value),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Time in Range", theme.bold)));
    lines.push(StackedRangeBar::new(&payload.segments, theme).to_line());
    lines.push(Line::from(""));

    // Highest range first, the way clinical reports stack them.
    for segment in payload.segments.iter().rev() {
        lines.push(RangeRow::new(segment, theme).to_line());
    }

    lines
}

pub fn render_summary_view(frame: &mut Frame, area: Rect, payload: &ReportPayload, theme: &Theme) {
    let lines = build_summary_lines(payload, theme);
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(" Summary "),
    );
    frame.render_widget(paragraph, area);
}

/// Placeholder shown on report tabs before a file is loaded.
pub fn render_no_report(frame: &mut Frame, area: Rect, message: Option<&str>, theme: &Theme) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled("No glucose data loaded", theme.warning)),
        Line::from(""),
    ];
    if let Some(message) = message {
        text.push(Line::from(Span::styled(message.to_string(), theme.error)));
        text.push(Line::from(""));
    }
    text.push(Line::from(Span::styled(
        "Start with a CSV or spreadsheet export: agp-report <FILE>",
        theme.dim,
    )));
    text.push(Line::from(Span::styled(
        "Press 4 for the records table, 'q' or Ctrl+C to exit",
        theme.dim,
    )));

    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" AGP Report "),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
