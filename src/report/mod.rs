//! Report data: figures derived from the assembled series and the payload
//! handed to the renderers. Building never fails; missing data travels as the
//! "No data" sentinel.

pub mod chart;
pub mod output;
pub mod template;

use crate::models::{Instrument, MonthlySummary, NO_DATA, QuotePoint, ReportPayload};
use crate::series::{self, AssembledSeries};
use crate::stats::{self, FormattedStats, PrecisionPolicy, SummaryStats};
use chrono::NaiveDate;

pub const WHOLE_PERIOD_IMG: &str = "wholePeriod.svg";
pub const LAST_FIVE_IMG: &str = "lastFive.svg";
pub const LAST_FIVE_MEAN_IMG: &str = "lastFiveMean.svg";
pub const LAST_MONTHS_IMG: &str = "lastMonths.svg";
pub const LAST_MONTHS_MEAN_IMG: &str = "lastMonthsMean.svg";

/// Everything computed from one fetch, ready for charts, tables and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub visible: Vec<QuotePoint>,
    pub trailing: Vec<QuotePoint>,
    pub months: Vec<MonthlySummary>,
    /// Mean over the whole expanded series (overlay of the monthly chart).
    pub overall_mean: Option<f64>,
    pub stats: Option<SummaryStats>,
}

impl ReportData {
    pub fn analyze(
        series: &AssembledSeries,
        begin: NaiveDate,
        trailing_points: usize,
        policy: PrecisionPolicy,
    ) -> Self {
        let visible = series::visible_window(&series.points, begin).to_vec();
        let stats = stats::summarize(&visible, policy);
        Self {
            trailing: series::trailing(&series.points, trailing_points).to_vec(),
            months: stats::monthly_summaries(&series.months),
            overall_mean: stats::mean(&series.values()),
            stats,
            visible,
        }
    }

    pub fn formatted(&self) -> FormattedStats {
        FormattedStats::from_stats(self.stats.as_ref())
    }

    /// First and last observation dates actually covered by the window.
    pub fn covered_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.visible.first()?.date, self.visible.last()?.date))
    }
}

/// Image references as seen from the rendered report page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRefs {
    pub whole_period: String,
    pub last_five: String,
    pub monthly: String,
}

impl ImageRefs {
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let join = |file: &str| {
            if prefix.is_empty() { file.to_string() } else { format!("{}/{}", prefix, file) }
        };
        Self {
            whole_period: join(WHOLE_PERIOD_IMG),
            last_five: join(LAST_FIVE_IMG),
            monthly: join(LAST_MONTHS_IMG),
        }
    }
}

/// Append the unit marker unless the figure is the sentinel.
pub fn with_unit(figure: &str, unit: &str) -> String {
    if figure == NO_DATA || unit.is_empty() {
        figure.to_string()
    } else {
        format!("{} {}", figure, unit)
    }
}

pub fn build_payload(
    instrument: &Instrument,
    data: &ReportData,
    unit: &str,
    images: &ImageRefs,
) -> ReportPayload {
    let figures = data.formatted();
    let (begin, end) = data
        .covered_dates()
        .map(|(b, e)| (b.to_string(), e.to_string()))
        .unwrap_or_else(|| (NO_DATA.to_string(), NO_DATA.to_string()));

    ReportPayload {
        name: instrument.display_name().to_string(),
        code: instrument.code().unwrap_or(NO_DATA).to_string(),
        begin,
        end,
        begin_val: with_unit(&figures.first, unit),
        end_val: with_unit(&figures.last, unit),
        average: with_unit(&figures.mean, unit),
        min_val: with_unit(&figures.min, unit),
        max_val: with_unit(&figures.max, unit),
        fig: images.whole_period.clone(),
        fig1: images.last_five.clone(),
        fig2: images.monthly.clone(),
    }
}
