//! Stitching per-chunk results into one chronological series.

use crate::models::{ChunkOutcome, QuotePoint};
use chrono::NaiveDate;
use tracing::debug;

/// Full expanded series plus the per-chunk grouping needed for monthly means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledSeries {
    pub points: Vec<QuotePoint>,
    /// Non-empty chunk contents, in chunk order.
    pub months: Vec<Vec<QuotePoint>>,
    pub unavailable_chunks: usize,
}

impl AssembledSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Concatenate chunk outcomes in order. Unavailable or empty chunks add
/// nothing; a point whose date does not advance the series is dropped so the
/// result stays strictly increasing.
pub fn assemble(outcomes: &[ChunkOutcome]) -> AssembledSeries {
    let mut series = AssembledSeries::default();

    for outcome in outcomes {
        if outcome.is_unavailable() {
            debug!("{}: no points", outcome.chunk());
            series.unavailable_chunks += 1;
            continue;
        }

        let mut month = Vec::with_capacity(outcome.points().len());
        for point in outcome.points() {
            if series.points.last().is_some_and(|last| last.date >= point.date) {
                continue;
            }
            series.points.push(*point);
            month.push(*point);
        }

        if !month.is_empty() {
            series.months.push(month);
        }
    }

    series
}

/// Sub-series starting at the first observation on or after `begin`.
///
/// When `begin` itself has no observation (weekend, holiday, failed chunk) the
/// window starts at the next day that does. A `begin` past the last
/// observation yields an empty window.
pub fn visible_window(points: &[QuotePoint], begin: NaiveDate) -> &[QuotePoint] {
    let Some(last) = points.last() else {
        return &[];
    };
    if begin > last.date {
        return &[];
    }
    let idx = points.partition_point(|p| p.date < begin);
    &points[idx..]
}

/// The last `n` points, or all of them when fewer exist.
pub fn trailing(points: &[QuotePoint], n: usize) -> &[QuotePoint] {
    &points[points.len().saturating_sub(n)..]
}
