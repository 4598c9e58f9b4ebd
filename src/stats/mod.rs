use crate::config::ReportConfig;
use crate::models::{MonthlySummary, NO_DATA, QuotePoint};

// ── Precision policy ──────────────────────────────────────────────────────────

/// Chooses how many decimals to print based on the magnitude of a reference
/// value: `coarse` at or above `threshold`, `fine` below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionPolicy {
    pub threshold: f64,
    pub coarse: usize,
    pub fine: usize,
}

impl Default for PrecisionPolicy {
    fn default() -> Self {
        Self { threshold: 0.009, coarse: 2, fine: 3 }
    }
}

impl From<&ReportConfig> for PrecisionPolicy {
    fn from(cfg: &ReportConfig) -> Self {
        Self {
            threshold: cfg.precision_threshold,
            coarse: cfg.coarse_decimals,
            fine: cfg.fine_decimals,
        }
    }
}

impl PrecisionPolicy {
    pub fn decimals_for(&self, reference: f64) -> usize {
        if reference >= self.threshold { self.coarse } else { self.fine }
    }
}

pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ── Summary statistics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub decimals: usize,
}

/// First/last/min/max/mean over the visible window; `None` when it is empty.
pub fn summarize(window: &[QuotePoint], policy: PrecisionPolicy) -> Option<SummaryStats> {
    let first = window.first()?;
    let last = window.last()?;

    let (min, max) = window.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.value), hi.max(p.value))
    });
    let values: Vec<f64> = window.iter().map(|p| p.value).collect();

    Some(SummaryStats {
        first: first.value,
        last: last.value,
        min,
        max,
        mean: mean(&values)?,
        decimals: policy.decimals_for(first.value),
    })
}

/// Summary figures as display strings, or the "No data" sentinel throughout.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedStats {
    pub first: String,
    pub last: String,
    pub min: String,
    pub max: String,
    pub mean: String,
}

impl FormattedStats {
    pub fn no_data() -> Self {
        Self {
            first: NO_DATA.to_string(),
            last: NO_DATA.to_string(),
            min: NO_DATA.to_string(),
            max: NO_DATA.to_string(),
            mean: NO_DATA.to_string(),
        }
    }

    pub fn from_stats(stats: Option<&SummaryStats>) -> Self {
        let Some(s) = stats else {
            return Self::no_data();
        };
        Self {
            first: format_fixed(s.first, s.decimals),
            last: format_fixed(s.last, s.decimals),
            min: format_fixed(s.min, s.decimals),
            max: format_fixed(s.max, s.decimals),
            mean: format_fixed(s.mean, s.decimals),
        }
    }
}

// ── Monthly means ─────────────────────────────────────────────────────────────

/// One summary per non-empty month, labelled "January 2024" style from the
/// month's first observation.
pub fn monthly_summaries(months: &[Vec<QuotePoint>]) -> Vec<MonthlySummary> {
    months
        .iter()
        .filter_map(|month| {
            let first = month.first()?;
            let values: Vec<f64> = month.iter().map(|p| p.value).collect();
            Some(MonthlySummary {
                label: first.date.format("%B %Y").to_string(),
                mean: mean(&values)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn window(values: &[f64]) -> Vec<QuotePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| QuotePoint::new(d(2024, 3, 1 + i as u32), v))
            .collect()
    }

    #[test]
    fn test_precision_switch() {
        let policy = PrecisionPolicy::default();
        assert_eq!(policy.decimals_for(0.008), 3);
        assert_eq!(policy.decimals_for(0.009), 2);
        assert_eq!(policy.decimals_for(0.01), 2);
        assert_eq!(policy.decimals_for(4.2), 2);
    }

    #[test]
    fn test_policy_from_report_config() {
        let cfg = ReportConfig {
            precision_threshold: 1.0,
            coarse_decimals: 1,
            fine_decimals: 4,
            ..ReportConfig::default()
        };
        let policy = PrecisionPolicy::from(&cfg);
        assert_eq!(policy.decimals_for(1.5), 1);
        assert_eq!(policy.decimals_for(0.5), 4);
        assert_eq!(PrecisionPolicy::from(&ReportConfig::default()), PrecisionPolicy::default());
    }

    #[test]
    fn test_low_magnitude_formats_three_decimals() {
        let stats = summarize(&window(&[0.008, 0.0071, 0.0094]), PrecisionPolicy::default())
            .unwrap();
        let f = FormattedStats::from_stats(Some(&stats));
        assert_eq!(f.first, "0.008");
        assert_eq!(f.min, "0.007");
        assert_eq!(f.max, "0.009");
        assert_eq!(f.last, "0.009");
    }

    #[test]
    fn test_unit_magnitude_formats_two_decimals() {
        let stats = summarize(&window(&[0.01, 0.02]), PrecisionPolicy::default()).unwrap();
        assert_eq!(stats.decimals, 2);
        assert_eq!(FormattedStats::from_stats(Some(&stats)).first, "0.01");
    }

    #[test]
    fn test_summary_over_window() {
        let stats = summarize(&window(&[4.1, 3.9, 4.4, 4.0]), PrecisionPolicy::default()).unwrap();
        assert_eq!(stats.first, 4.1);
        assert_eq!(stats.last, 4.0);
        assert_eq!(stats.min, 3.9);
        assert_eq!(stats.max, 4.4);
        assert!((stats.mean - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_is_no_data() {
        assert!(summarize(&[], PrecisionPolicy::default()).is_none());
        let f = FormattedStats::from_stats(None);
        assert_eq!(f, FormattedStats::no_data());
        assert_eq!(f.mean, "No data");
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_monthly_summaries_label_and_mean() {
        let months = vec![
            vec![QuotePoint::new(d(2023, 12, 4), 4.0), QuotePoint::new(d(2023, 12, 5), 5.0)],
            vec![],
            vec![QuotePoint::new(d(2024, 1, 2), 3.0)],
        ];
        let summaries = monthly_summaries(&months);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].label, "December 2023");
        assert_eq!(summaries[0].mean, 4.5);
        assert_eq!(summaries[1].label, "January 2024");
    }
}
