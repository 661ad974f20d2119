use crate::themes::Theme;
use agp_core::formatting::format_percent;
use agp_runtime::payload::RangeSegment;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Configuration controlling visual appearance of range bars.
pub struct BarConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used for filled cells.
    pub filled_char: char,
    /// Character used for empty cells.
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 50,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// Split `width` cells between `percentages` with the largest-remainder rule.
///
/// The cells handed out never exceed the share the percentages cover, so a
/// total under 100 % leaves trailing cells unassigned.
pub fn allocate_cells(percentages: &[f64], width: u16) -> Vec<u16> {
    let width_f = f64::from(width);
    let exact: Vec<f64> = percentages
        .iter()
        .map(|p| p.clamp(0.0, 100.0) / 100.0 * width_f)
        .collect();
    let mut cells: Vec<u16> = exact.iter().map(|e| e.floor() as u16).collect();

    let target = exact.iter().sum::<f64>().round().min(width_f) as u16;
    let mut assigned: u16 = cells.iter().sum();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa)
    });
    for idx in order {
        if assigned >= target {
            break;
        }
        if exact[idx] > f64::from(cells[idx]) {
            cells[idx] += 1;
            assigned += 1;
        }
    }
    cells
}

// ── StackedRangeBar ──────────────────────────────────────────────────────────

/// A proportional multi-coloured bar stacking every time-in-range bucket.
pub struct StackedRangeBar<'a> {
    pub segments: &'a [RangeSegment],
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> StackedRangeBar<'a> {
    pub fn new(segments: &'a [RangeSegment], theme: &'a Theme) -> Self {
        Self {
            segments,
            theme,
            config: BarConfig::default(),
        }
    }

    /// Render the bar as a [`Line`]; empty buckets produce no span.
    pub fn to_line(&self) -> Line<'a> {
        let percentages: Vec<f64> = self.segments.iter().map(|s| s.percent).collect();
        let cells = allocate_cells(&percentages, self.config.width);

        let mut spans: Vec<Span<'a>> = Vec::new();
        for (segment, &n) in self.segments.iter().zip(&cells) {
            if n > 0 {
                let fill: String =
                    std::iter::repeat_n(self.config.filled_char, n as usize).collect();
                spans.push(Span::styled(fill, self.theme.range_style(segment.bucket)));
            }
        }

        let used: u16 = cells.iter().sum();
        let rest = self.config.width.saturating_sub(used);
        if rest > 0 {
            let empty: String = std::iter::repeat_n(self.config.empty_char, rest as usize).collect();
            spans.push(Span::styled(empty, self.theme.dim));
        }
        Line::from(spans)
    }
}

// ── RangeRow ─────────────────────────────────────────────────────────────────

/// Column width the bucket label is padded to.
const LABEL_WIDTH: usize = 26;

/// One bucket rendered as `<label> [<bar>] <pct>`.
pub struct RangeRow<'a> {
    pub segment: &'a RangeSegment,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> RangeRow<'a> {
    pub fn new(segment: &'a RangeSegment, theme: &'a Theme) -> Self {
        Self {
            segment,
            theme,
            config: BarConfig {
                width: 30,
                ..BarConfig::default()
            },
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let style = self.theme.range_style(self.segment.bucket);
        let pct = self.segment.percent.clamp(0.0, 100.0);
        let filled = ((pct / 100.0) * f64::from(self.config.width)).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String = std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        Line::from(vec![
            Span::styled(pad_label(&self.segment.label, LABEL_WIDTH), style),
            Span::styled(" [", self.theme.dim),
            Span::styled(filled_str, style),
            Span::styled(empty_str, self.theme.dim),
            Span::styled("] ", self.theme.dim),
            Span::styled(
                format!("{:>6}", format_percent(self.segment.percent)),
                self.theme.value,
            ),
        ])
    }
}

/// Right-pad `label` to `width` display columns.
fn pad_label(label: &str, width: usize) -> String {
    let shown = UnicodeWidthStr::width(label);
    format!("{}{}", label, " ".repeat(width.saturating_sub(shown)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agp_core::ranges::RangeBucket;

    fn segments(percents: [f64; 5]) -> Vec<RangeSegment> {
        RangeBucket::ALL
            .iter()
            .zip(percents)
            .map(|(&bucket, percent)| RangeSegment {
                bucket,
                label: bucket.label().to_string(),
                percent,
            })
            .collect()
    }

    fn width_of(line: &Line) -> usize {
        line.spans.iter().map(|s| s.content.chars().count()).sum()
    }

    // ── allocate_cells ───────────────────────────────────────────────────────

    #[test]
    fn test_allocate_cells_fills_width_at_100() {
        let cells = allocate_cells(&[33.3, 33.3, 33.4], 10);
        assert_eq!(cells.iter().sum::<u16>(), 10);
    }

    #[test]
    fn test_allocate_cells_largest_remainder() {
        // 2.5 / 2.5 / 5.0 of 10 cells: one of the halves gets rounded up.
        let cells = allocate_cells(&[25.0, 25.0, 50.0], 10);
        assert_eq!(cells.iter().sum::<u16>(), 10);
        assert_eq!(cells[2], 5);
    }

    #[test]
    fn test_allocate_cells_under_100_leaves_gap() {
        let cells = allocate_cells(&[25.0, 25.0], 40);
        assert_eq!(cells, vec![10, 10]);
    }

    #[test]
    fn test_allocate_cells_zero_percent_gets_nothing() {
        let cells = allocate_cells(&[0.0, 100.0, 0.0], 50);
        assert_eq!(cells, vec![0, 50, 0]);
    }

    // ── StackedRangeBar ──────────────────────────────────────────────────────

    #[test]
    fn test_stacked_bar_all_target() {
        let theme = Theme::dark();
        let segs = segments([0.0, 0.0, 100.0, 0.0, 0.0]);
        let line = StackedRangeBar::new(&segs, &theme).to_line();

        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content.chars().count(), 50);
        assert_eq!(line.spans[0].style, theme.range_target);
    }

    #[test]
    fn test_stacked_bar_keeps_full_width() {
        let theme = Theme::dark();
        let segs = segments([1.0, 3.0, 71.0, 18.0, 7.0]);
        let line = StackedRangeBar::new(&segs, &theme).to_line();
        assert_eq!(width_of(&line), 50);
    }

    #[test]
    fn test_stacked_bar_pads_missing_share() {
        let theme = Theme::dark();
        let segs = segments([0.0, 0.0, 50.0, 0.0, 0.0]);
        let line = StackedRangeBar::new(&segs, &theme).to_line();
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[1].content.chars().count(), 25);
    }

    // ── RangeRow ─────────────────────────────────────────────────────────────

    #[test]
    fn test_range_row_layout() {
        let theme = Theme::dark();
        let segs = segments([0.0, 0.0, 50.0, 0.0, 0.0]);
        let line = RangeRow::new(&segs[2], &theme).to_line();

        assert_eq!(line.spans.len(), 6);
        assert_eq!(line.spans[0].content.chars().count(), LABEL_WIDTH);
        assert_eq!(line.spans[2].content.chars().count(), 15);
        assert_eq!(line.spans[3].content.chars().count(), 15);
        assert_eq!(line.spans[5].content.trim(), "50.0%");
    }

    #[test]
    fn test_pad_label_counts_display_width() {
        assert_eq!(pad_label("Low", 6), "Low   ");
        assert_eq!(pad_label("Very Long Label", 4), "Very Long Label");
    }
}
