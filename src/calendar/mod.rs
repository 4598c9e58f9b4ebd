//! Month-aligned partitioning of the fetch window.
//!
//! The remote source caps how much history a single request may cover, and the
//! monthly-means chart needs one bucket per calendar month, so every fetch is
//! split on month boundaries. The window itself is widened to at least
//! `min_days` so short requests still have enough history for the trailing
//! and monthly charts.

use crate::config::ReportConfig;
use crate::models::{Chunk, DateRange};
use chrono::{Datelike, Days, NaiveDate};

/// How far back the fetch window reaches relative to the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub min_days: i64,
    pub step_days: i64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self { min_days: 155, step_days: 5 }
    }
}

impl From<&ReportConfig> for WindowPolicy {
    fn from(cfg: &ReportConfig) -> Self {
        Self {
            min_days: cfg.min_window_days,
            step_days: cfg.window_step_days.max(1),
        }
    }
}

/// Smallest multiple of `step` that is `>= n`.
pub fn round_up_to_multiple(n: i64, step: i64) -> i64 {
    let rem = n.rem_euclid(step);
    if rem == 0 { n } else { n + step - rem }
}

/// First day of the expanded fetch window ending at `range.end`.
pub fn expanded_start(range: DateRange, policy: WindowPolicy) -> NaiveDate {
    let span = range.span_days();
    let back = if span <= policy.min_days {
        policy.min_days
    } else {
        round_up_to_multiple(span, policy.step_days)
    };
    range
        .end
        .checked_sub_days(Days::new(back.max(0) as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// Number of calendar months touched by `[start, end]`; always at least 1.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> u32 {
    let months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    months.max(1) as u32
}

/// Last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        return NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
    }
    NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Split `[start, end]` into contiguous chunks, one per calendar month.
///
/// Every chunk but the last ends on a month's final day; the last always ends
/// exactly at `end`, truncating a partial month.
pub fn month_chunks(start: NaiveDate, end: NaiveDate) -> Vec<Chunk> {
    let months = months_spanned(start, end);
    let mut chunks = Vec::with_capacity(months as usize);
    let mut cursor = start;

    for _ in 1..months {
        let chunk_end = end_of_month(cursor);
        chunks.push(Chunk { begin: cursor, end: chunk_end });
        cursor = chunk_end.succ_opt().unwrap_or(chunk_end);
    }

    chunks.push(Chunk { begin: cursor, end });
    chunks
}

/// Expand the requested range and partition the result into month chunks.
pub fn partition(range: DateRange, policy: WindowPolicy) -> Vec<Chunk> {
    month_chunks(expanded_start(range, policy), range.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn range(b: NaiveDate, e: NaiveDate) -> DateRange {
        DateRange::new(b, e).unwrap()
    }

    fn assert_contiguous(chunks: &[Chunk], end: NaiveDate) {
        assert!(!chunks.is_empty());
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].begin, pair[0].end.succ_opt().unwrap());
        }
        for c in chunks {
            assert!(c.begin <= c.end);
            assert_eq!((c.begin.year(), c.begin.month()), (c.end.year(), c.end.month()));
        }
        assert_eq!(chunks.last().unwrap().end, end);
    }

    #[test]
    fn test_round_up_to_multiple() {
        assert_eq!(round_up_to_multiple(156, 5), 160);
        assert_eq!(round_up_to_multiple(160, 5), 160);
        assert_eq!(round_up_to_multiple(0, 5), 0);
        assert_eq!(round_up_to_multiple(161, 5), 165);
    }

    #[test]
    fn test_short_span_uses_minimum_window() {
        let policy = WindowPolicy::default();
        for (b, e) in [
            (d(2024, 1, 10), d(2024, 1, 10)),
            (d(2024, 1, 2), d(2024, 1, 10)),
            (d(2023, 8, 8), d(2024, 1, 10)),
        ] {
            let start = expanded_start(range(b, e), policy);
            assert_eq!((e - start).num_days(), 155);
        }
        assert_eq!(expanded_start(range(d(2024, 1, 2), d(2024, 1, 10)), policy), d(2023, 8, 8));
    }

    #[test]
    fn test_long_span_rounds_to_step() {
        let policy = WindowPolicy::default();
        for days in [156_i64, 157, 200, 365, 1001] {
            let end = d(2024, 6, 30);
            let begin = end - chrono::TimeDelta::days(days);
            let start = expanded_start(range(begin, end), policy);
            let window = (end - start).num_days();
            assert_eq!(window % 5, 0, "span {days}");
            assert!(window >= days, "span {days}");
            assert!(window - days < 5, "span {days}");
        }
    }

    #[test]
    fn test_months_spanned_boundaries() {
        assert_eq!(months_spanned(d(2024, 1, 5), d(2024, 1, 5)), 1);
        assert_eq!(months_spanned(d(2024, 1, 1), d(2024, 1, 31)), 1);
        assert_eq!(months_spanned(d(2024, 1, 31), d(2024, 2, 1)), 2);
        assert_eq!(months_spanned(d(2023, 12, 31), d(2024, 1, 1)), 2);
        assert_eq!(months_spanned(d(2023, 8, 8), d(2024, 1, 10)), 6);
        assert_eq!(months_spanned(d(2021, 11, 15), d(2024, 2, 1)), 28);
        // reversed input still yields a single chunk
        assert_eq!(months_spanned(d(2024, 3, 1), d(2024, 1, 1)), 1);
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(end_of_month(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(end_of_month(d(2023, 2, 1)), d(2023, 2, 28));
        assert_eq!(end_of_month(d(2023, 12, 5)), d(2023, 12, 31));
        assert_eq!(end_of_month(d(2024, 4, 30)), d(2024, 4, 30));
    }

    #[test]
    fn test_single_month_yields_one_chunk() {
        let chunks = month_chunks(d(2024, 1, 3), d(2024, 1, 20));
        assert_eq!(chunks, vec![Chunk { begin: d(2024, 1, 3), end: d(2024, 1, 20) }]);

        let zero = month_chunks(d(2024, 1, 20), d(2024, 1, 20));
        assert_eq!(zero.len(), 1);
        assert!(zero[0].is_single_day());
    }

    #[test]
    fn test_partition_short_request() {
        let end = d(2024, 1, 10);
        let chunks = partition(range(d(2024, 1, 2), end), WindowPolicy::default());
        assert_contiguous(&chunks, end);
        assert_eq!(chunks.len(), 6);
        assert_eq!(chunks[0], Chunk { begin: d(2023, 8, 8), end: d(2023, 8, 31) });
        assert_eq!(chunks[4], Chunk { begin: d(2023, 12, 1), end: d(2023, 12, 31) });
        assert_eq!(chunks[5], Chunk { begin: d(2024, 1, 1), end });
    }

    #[test]
    fn test_partition_crosses_several_years() {
        let end = d(2024, 3, 15);
        let chunks = partition(range(d(2021, 10, 20), end), WindowPolicy::default());
        assert_contiguous(&chunks, end);
        let start = chunks[0].begin;
        assert_eq!((end - start).num_days() % 5, 0);
        assert_eq!(chunks.len() as u32, months_spanned(start, end));
    }

    #[test]
    fn test_partition_ending_on_month_boundary() {
        let end = d(2024, 1, 31);
        let chunks = partition(range(d(2024, 1, 1), end), WindowPolicy::default());
        assert_contiguous(&chunks, end);
        assert_eq!(chunks.last().unwrap().begin, d(2024, 1, 1));
    }
}
