use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Width of the `=` rule under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering three lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Source information in `[ file | N readings ]` format, or a hint when
///    nothing is loaded.
pub struct Header<'a> {
    /// File name of the loaded export, if any.
    pub source: Option<&'a str>,
    /// Number of readings in the loaded export.
    pub readings: Option<usize>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: Option<&'a str>, readings: Option<usize>, theme: &'a Theme) -> Self {
        Self {
            source,
            readings,
            theme,
        }
    }

    /// Render the header as exactly three lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let info = match (self.source, self.readings) {
            (Some(source), Some(readings)) => Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(source.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    format!("{} readings", agp_core::formatting::format_count(readings)),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
            _ => Line::from(Span::styled("[ no file loaded ]", self.theme.dim)),
        };

        vec![
            Line::from(Span::styled("AMBULATORY GLUCOSE PROFILE", self.theme.header)),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            info,
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
