use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel rendered wherever a figure could not be computed.
pub const NO_DATA: &str = "No data";

// ── Instrument ────────────────────────────────────────────────────────────────

/// Which NBP table publishes a currency's mid rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableType {
    A,
    B,
}

impl TableType {
    /// Path segment used by the rates endpoint ("a" / "b").
    pub fn letter(self) -> &'static str {
        match self {
            TableType::A => "a",
            TableType::B => "b",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::A => write!(f, "A"),
            TableType::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Instrument {
    Currency {
        name: String,
        code: String,
        table: TableType,
    },
    Gold,
}

impl Instrument {
    pub fn display_name(&self) -> &str {
        match self {
            Instrument::Currency { name, .. } => name,
            Instrument::Gold => "gold",
        }
    }

    /// Currency code, or `None` for the commodity.
    pub fn code(&self) -> Option<&str> {
        match self {
            Instrument::Currency { code, .. } => Some(code),
            Instrument::Gold => None,
        }
    }

    /// Earliest date the source publishes for this instrument kind.
    pub fn data_floor(&self) -> NaiveDate {
        match self {
            Instrument::Currency { .. } => NaiveDate::from_ymd_opt(2002, 1, 2),
            Instrument::Gold => NaiveDate::from_ymd_opt(2013, 1, 2),
        }
        .unwrap_or(NaiveDate::MIN)
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Inclusive calendar range with `begin <= end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `begin > end`.
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Option<Self> {
        (begin <= end).then_some(Self { begin, end })
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.begin).num_days()
    }

    pub fn is_single_day(&self) -> bool {
        self.begin == self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.begin, self.end)
    }
}

/// A date range that never crosses a calendar month boundary.
pub type Chunk = DateRange;

// ── Observations ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuotePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl QuotePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Result of fetching a single chunk. Failures never escape a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Fetched { chunk: Chunk, points: Vec<QuotePoint> },
    Unavailable { chunk: Chunk },
}

impl ChunkOutcome {
    pub fn chunk(&self) -> Chunk {
        match self {
            ChunkOutcome::Fetched { chunk, .. } | ChunkOutcome::Unavailable { chunk } => *chunk,
        }
    }

    /// Points of the chunk; empty when unavailable.
    pub fn points(&self) -> &[QuotePoint] {
        match self {
            ChunkOutcome::Fetched { points, .. } => points,
            ChunkOutcome::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ChunkOutcome::Unavailable { .. })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlySummary {
    pub label: String,
    pub mean: f64,
}

// ── Rate table ────────────────────────────────────────────────────────────────

/// One row of a published NBP rate table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyRate {
    pub name: String,
    pub code: String,
    pub mid: f64,
    pub table: TableType,
}

// ── Report payload ────────────────────────────────────────────────────────────

/// Structured payload handed to the report template (`generalData.json`).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub name: String,
    pub code: String,
    pub begin: String,
    pub end: String,
    pub begin_val: String,
    pub end_val: String,
    pub average: String,
    pub min_val: String,
    pub max_val: String,
    pub fig: String,
    pub fig1: String,
    pub fig2: String,
}

/// Payload for the table pages (price table, currency table).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TablePayload {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
