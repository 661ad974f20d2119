/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use agp_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(6.99368, 1), "7.0");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-12.25, 1), "-12.3");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let negative = value < 0.0;

    // Nudge by a relative epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let abs_value = value.abs();
    let rounded = ((abs_value * factor) + f64::EPSILON * abs_value * factor).round() / factor;

    let fixed = format!("{:.prec$}", rounded, prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if negative && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a count with thousands separators.
///
/// ```
/// use agp_core::formatting::format_count;
///
/// assert_eq!(format_count(2_688), "2,688");
/// ```
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Format a glucose concentration, e.g. `"154.0 mg/dL"`.
pub fn format_mg_dl(value: f64) -> String {
    format!("{} mg/dL", format_number(value, 1))
}

/// Format a percentage with one decimal, e.g. `"7.0%"`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 1))
}

/// Like [`format_percent`], rendering `None` as `"n/a"`.
pub fn format_optional_percent(value: Option<f64>) -> String {
    value.map(format_percent).unwrap_or_else(|| "n/a".to_string())
}

/// Calculate `(part / whole) * 100` without rounding.
///
/// Returns `None` if `whole` is zero.
///
/// ```
/// use agp_core::formatting::percentage;
///
/// assert_eq!(percentage(1.0, 4.0), Some(25.0));
/// assert_eq!(percentage(1.0, 0.0), None);
/// ```
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        return None;
    }
    Some(part / whole * 100.0)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_rounds_half_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
        assert_eq!(format_number(6.99368, 1), "7.0");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero() {
        assert_eq!(format_number(-0.01, 1), "0.0");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::INFINITY, 1), "inf");
    }

    // ── domain formatters ────────────────────────────────────────────────────

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
    }

    #[test]
    fn test_format_mg_dl() {
        assert_eq!(format_mg_dl(154.0), "154.0 mg/dL");
        assert_eq!(format_mg_dl(125.04), "125.0 mg/dL");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(100.0), "100.0%");
        assert_eq!(format_percent(33.333), "33.3%");
    }

    #[test]
    fn test_format_optional_percent() {
        assert_eq!(format_optional_percent(Some(36.0)), "36.0%");
        assert_eq!(format_optional_percent(None), "n/a");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0).unwrap();
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0), None);
    }
}
