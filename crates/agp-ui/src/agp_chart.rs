//! AGP tab: percentile bands over the day with the target range marked.

use ratatui::{
    layout::Rect,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use agp_runtime::payload::{ChartSeries, ReportPayload, SeriesKind, DAY_END_HOURS, DAY_START_HOURS};

use crate::themes::Theme;

/// Y-axis ticks are rounded up to this step.
const Y_STEP: f64 = 50.0;

/// Back-to-front drawing order so the median ends up on top.
const DRAW_ORDER: [SeriesKind; 7] = [
    SeriesKind::TargetLow,
    SeriesKind::TargetHigh,
    SeriesKind::P5,
    SeriesKind::P95,
    SeriesKind::P25,
    SeriesKind::P75,
    SeriesKind::Median,
];

/// Round `max` up to the next multiple of [`Y_STEP`], never below one step.
pub fn y_upper_bound(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return Y_STEP;
    }
    (max / Y_STEP).ceil() * Y_STEP
}

/// The chart series in drawing order.
pub fn ordered_series(payload: &ReportPayload) -> Vec<&ChartSeries> {
    DRAW_ORDER
        .iter()
        .filter_map(|&kind| payload.series(kind))
        .collect()
}

pub fn render_agp_chart(frame: &mut Frame, area: Rect, payload: &ReportPayload, theme: &Theme) {
    let datasets: Vec<Dataset> = ordered_series(payload)
        .into_iter()
        .map(|series| {
            let dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.series_style(series.kind))
                .data(&series.points);
            // Legend lists each band pair once.
            match series.kind {
                SeriesKind::P95 | SeriesKind::P75 | SeriesKind::TargetHigh => dataset,
                SeriesKind::P5 => dataset.name("5-95%"),
                SeriesKind::P25 => dataset.name("25-75%"),
                SeriesKind::Median => dataset.name("Median"),
                SeriesKind::TargetLow => dataset.name("Target 70-180"),
            }
        })
        .collect();

    let y_max = y_upper_bound(payload.chart_max());
    let y_mid = (y_max / 2.0).round();

    let x_labels: Vec<Span> = ["00:00", "06:00", "12:00", "18:00", "24:00"]
        .into_iter()
        .map(|l| Span::styled(l, theme.axis))
        .collect();
    let y_labels: Vec<Span> = [0.0, y_mid, y_max]
        .into_iter()
        .map(|v| Span::styled(format!("{v:.0}"), theme.axis))
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Ambulatory Glucose Profile "),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("Time of day", theme.label))
                .style(theme.axis)
                .bounds([DAY_START_HOURS, DAY_END_HOURS])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("mg/dL", theme.label))
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
