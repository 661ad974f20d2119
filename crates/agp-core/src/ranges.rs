use crate::error::AgpError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinical glucose ranges used for time-in-range classification.
///
/// Intervals are half-open `[lower, upper)` in mg/dL and contiguous over
/// `[0, ∞)`. Negative values fall in no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBucket {
    /// `[0, 54)` mg/dL.
    VeryLow,
    /// `[54, 70)` mg/dL.
    Low,
    /// `[70, 181)` mg/dL.
    Target,
    /// `[181, 251)` mg/dL.
    High,
    /// `[251, ∞)` mg/dL.
    VeryHigh,
}

impl RangeBucket {
    /// All buckets in stacking order, lowest first.
    pub const ALL: [RangeBucket; 5] = [
        RangeBucket::VeryLow,
        RangeBucket::Low,
        RangeBucket::Target,
        RangeBucket::High,
        RangeBucket::VeryHigh,
    ];

    /// Inclusive lower bound in mg/dL.
    pub fn lower(&self) -> f64 {
        match self {
            RangeBucket::VeryLow => 0.0,
            RangeBucket::Low => 54.0,
            RangeBucket::Target => 70.0,
            RangeBucket::High => 181.0,
            RangeBucket::VeryHigh => 251.0,
        }
    }

    /// Exclusive upper bound in mg/dL (`f64::INFINITY` for the top bucket).
    pub fn upper(&self) -> f64 {
        match self {
            RangeBucket::VeryLow => 54.0,
            RangeBucket::Low => 70.0,
            RangeBucket::Target => 181.0,
            RangeBucket::High => 251.0,
            RangeBucket::VeryHigh => f64::INFINITY,
        }
    }

    /// Whether `value` lies inside this bucket's interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower() && value < self.upper()
    }

    /// The bucket containing `value`, or `None` for negative (or NaN) values.
    pub fn classify(value: f64) -> Option<RangeBucket> {
        Self::ALL.into_iter().find(|b| b.contains(value))
    }

    /// The canonical snake_case key for this bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeBucket::VeryLow => "very_low",
            RangeBucket::Low => "low",
            RangeBucket::Target => "target",
            RangeBucket::High => "high",
            RangeBucket::VeryHigh => "very_high",
        }
    }

    /// Human-readable label as printed on reports.
    pub fn label(&self) -> &'static str {
        match self {
            RangeBucket::VeryLow => "Very Low (<54 mg/dL)",
            RangeBucket::Low => "Low (54-69 mg/dL)",
            RangeBucket::Target => "Target (70-180 mg/dL)",
            RangeBucket::High => "High (181-250 mg/dL)",
            RangeBucket::VeryHigh => "Very High (>250 mg/dL)",
        }
    }
}

impl fmt::Display for RangeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeBucket {
    type Err = AgpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "very_low" => Ok(RangeBucket::VeryLow),
            "low" => Ok(RangeBucket::Low),
            "target" => Ok(RangeBucket::Target),
            "high" => Ok(RangeBucket::High),
            "very_high" => Ok(RangeBucket::VeryHigh),
            other => Err(AgpError::Config(format!("unknown range bucket: {other}"))),
        }
    }
}

// ── Shared constants ──────────────────────────────────────────────────────────

/// Lower edge of the clinical target band drawn on AGP charts (mg/dL).
pub const TARGET_LOW_MG_DL: f64 = 70.0;

/// Upper edge of the clinical target band drawn on AGP charts (mg/dL).
pub const TARGET_HIGH_MG_DL: f64 = 180.0;

/// Intercept of the Glucose Management Indicator formula.
pub const GMI_INTERCEPT: f64 = 3.31;

/// Slope of the Glucose Management Indicator formula (per mg/dL).
pub const GMI_SLOPE: f64 = 0.02392;

/// Glucose Management Indicator (estimated HbA1c, %) for a mean glucose in mg/dL.
pub fn gmi(mean_mg_dl: f64) -> f64 {
    GMI_INTERCEPT + GMI_SLOPE * mean_mg_dl
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_are_contiguous() {
        for pair in RangeBucket::ALL.windows(2) {
            assert_eq!(pair[0].upper(), pair[1].lower());
        }
        assert_eq!(RangeBucket::VeryLow.lower(), 0.0);
        assert!(RangeBucket::VeryHigh.upper().is_infinite());
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(RangeBucket::classify(0.0), Some(RangeBucket::VeryLow));
        assert_eq!(RangeBucket::classify(53.9), Some(RangeBucket::VeryLow));
        assert_eq!(RangeBucket::classify(54.0), Some(RangeBucket::Low));
        assert_eq!(RangeBucket::classify(69.5), Some(RangeBucket::Low));
        assert_eq!(RangeBucket::classify(70.0), Some(RangeBucket::Target));
        assert_eq!(RangeBucket::classify(180.0), Some(RangeBucket::Target));
        assert_eq!(RangeBucket::classify(180.5), Some(RangeBucket::Target));
        assert_eq!(RangeBucket::classify(181.0), Some(RangeBucket::High));
        assert_eq!(RangeBucket::classify(250.9), Some(RangeBucket::High));
        assert_eq!(RangeBucket::classify(251.0), Some(RangeBucket::VeryHigh));
        assert_eq!(RangeBucket::classify(1e6), Some(RangeBucket::VeryHigh));
    }

    #[test]
    fn test_classify_negative_matches_nothing() {
        assert_eq!(RangeBucket::classify(-1.0), None);
        assert_eq!(RangeBucket::classify(f64::NAN), None);
    }

    #[test]
    fn test_from_str_round_trips_keys() {
        for bucket in RangeBucket::ALL {
            assert_eq!(bucket.as_str().parse::<RangeBucket>().unwrap(), bucket);
        }
        assert!("in_range".parse::<RangeBucket>().is_err());
    }

    #[test]
    fn test_gmi_for_mean_154() {
        let value = gmi(154.0);
        assert!((value - 6.99368).abs() < 1e-9, "gmi = {value}");
        assert_eq!(format!("{value:.1}"), "7.0");
    }
}
