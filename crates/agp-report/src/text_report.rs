//! Plain-text rendition of a [`ReportPayload`] for `--view summary`.

use std::fmt::Write;

use agp_core::formatting::{format_count, format_percent};
use agp_runtime::payload::ReportPayload;

const RULE_WIDTH: usize = 60;

pub fn render_summary(payload: &ReportPayload) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "AMBULATORY GLUCOSE PROFILE");
    let _ = writeln!(out, "{rule}");
    if let Some(source) = &payload.metadata.source {
        let _ = writeln!(out, "Source: {source}");
    }
    let _ = writeln!(out);

    for card in &payload.cards {
        let _ = writeln!(out, "{:<16}{}", card.title, card.value);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Time in Range");
    for segment in payload.segments.iter().rev() {
        let _ = writeln!(out, "  {:<26}{:>7}", segment.label, format_percent(segment.percent));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Daily Profiles");
    let _ = writeln!(
        out,
        "  {:<12}{:>8}{:>8}{:>8}{:>10}",
        "Date", "Min", "Max", "Mean", "Readings"
    );
    for row in &payload.daily {
        let _ = writeln!(
            out,
            "  {:<12}{:>8}{:>8}{:>8}{:>10}",
            row.date,
            row.min,
            row.max,
            row.mean,
            format_count(row.count)
        );
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agp_core::models::{Reading, Series};
    use agp_data::analysis::{analyze_series, AnalysisConfig};
    use chrono::NaiveDateTime;

    fn scenario_payload() -> ReportPayload {
        let ts = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        let series = Series::new(vec![
            Reading::new(ts("2024-01-01 08:00"), 70.0),
            Reading::new(ts("2024-01-01 08:00"), 180.0),
            Reading::new(ts("2024-01-02 08:00"), 125.0),
        ]);
        let report = analyze_series(&series, &AnalysisConfig::default()).unwrap();
        ReportPayload::from_report(&report)
    }

    #[test]
    fn test_render_summary_lists_cards_and_ranges() {
        let text = render_summary(&scenario_payload());

        assert!(text.starts_with("AMBULATORY GLUCOSE PROFILE\n"));
        assert!(text.contains("Mean Glucose    125.0 mg/dL"), "{text}");
        assert!(text.contains("Readings        3"), "{text}");

        let target = text
            .lines()
            .find(|l| l.trim_start().starts_with("Target"))
            .unwrap();
        assert!(target.ends_with("100.0%"), "{target}");
    }

    #[test]
    fn test_render_summary_has_one_row_per_day() {
        let text = render_summary(&scenario_payload());
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("2024-01-02"));
        let very_high = text.find("Very High").unwrap();
        let very_low = text.find("Very Low").unwrap();
        assert!(very_high < very_low);
    }
}
