use agp_core::ranges::RangeBucket;
use agp_runtime::payload::SeriesKind;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Complete theme definition carrying all UI styles used by agp-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header / tabs ────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Glucose ranges ───────────────────────────────────────────────────────
    pub range_very_low: Style,
    pub range_low: Style,
    pub range_target: Style,
    pub range_high: Style,
    pub range_very_high: Style,

    // ── AGP chart ────────────────────────────────────────────────────────────
    /// 5th and 95th percentile lines.
    pub band_outer: Style,
    /// 25th and 75th percentile lines.
    pub band_inner: Style,
    pub median: Style,
    pub target_line: Style,
    pub axis: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_selected: Style,
    pub cell_editing: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            range_very_low: Style::default().fg(Color::Red),
            range_low: Style::default().fg(Color::LightRed),
            range_target: Style::default().fg(Color::Green),
            range_high: Style::default().fg(Color::Yellow),
            range_very_high: Style::default().fg(Color::LightYellow),

            band_outer: Style::default().fg(Color::LightBlue),
            band_inner: Style::default().fg(Color::Blue),
            median: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            target_line: Style::default().fg(Color::Green),
            axis: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
            cell_editing: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text so that content remains legible against a
    /// white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            range_very_low: Style::default().fg(Color::Red),
            range_low: Style::default().fg(Color::LightRed),
            range_target: Style::default().fg(Color::Green),
            range_high: Style::default().fg(Color::Yellow),
            range_very_high: Style::default().fg(Color::Magenta),

            band_outer: Style::default().fg(Color::LightBlue),
            band_inner: Style::default().fg(Color::Blue),
            median: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            target_line: Style::default().fg(Color::Green),
            axis: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_selected: Style::default()
                .fg(Color::White)
                .bg(Color::Blue),
            cell_editing: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow),
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette.
    ///
    /// Avoids bold modifiers to maximise compatibility with minimal terminal
    /// emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),
            tab_active: Style::default().fg(Color::Yellow),
            tab_inactive: Style::default().fg(Color::White),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            range_very_low: Style::default().fg(Color::Red),
            range_low: Style::default().fg(Color::Magenta),
            range_target: Style::default().fg(Color::Green),
            range_high: Style::default().fg(Color::Yellow),
            range_very_high: Style::default().fg(Color::White),

            band_outer: Style::default().fg(Color::Cyan),
            band_inner: Style::default().fg(Color::Blue),
            median: Style::default().fg(Color::White),
            target_line: Style::default().fg(Color::Green),
            axis: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_selected: Style::default().fg(Color::Black).bg(Color::White),
            cell_editing: Style::default().fg(Color::Black).bg(Color::Yellow),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour for one time-in-range bucket.
    pub fn range_style(&self, bucket: RangeBucket) -> Style {
        match bucket {
            RangeBucket::VeryLow => self.range_very_low,
            RangeBucket::Low => self.range_low,
            RangeBucket::Target => self.range_target,
            RangeBucket::High => self.range_high,
            RangeBucket::VeryHigh => self.range_very_high,
        }
    }

    /// Line style for one AGP chart series.
    pub fn series_style(&self, kind: SeriesKind) -> Style {
        match kind {
            SeriesKind::P5 | SeriesKind::P95 => self.band_outer,
            SeriesKind::P25 | SeriesKind::P75 => self.band_inner,
            SeriesKind::Median => self.median,
            SeriesKind::TargetLow | SeriesKind::TargetHigh => self.target_line,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
