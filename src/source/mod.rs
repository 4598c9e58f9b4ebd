pub mod http_client;
pub mod nbp;

#[cfg(test)]
pub mod fake;

use crate::models::{Chunk, ChunkOutcome, CurrencyRate, Instrument, QuotePoint, TableType};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub use self::nbp::NbpSource;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing published for the requested range (weekend, holiday, too early).
    #[error("no data published for the requested range")]
    NoData,

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable quote source abstraction.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Observations of `instrument` inside `chunk`, chronological.
    async fn fetch_series(
        &self,
        instrument: &Instrument,
        chunk: Chunk,
    ) -> Result<Vec<QuotePoint>, SourceError>;

    /// The latest published rate table of the given type.
    async fn fetch_rate_table(&self, table: TableType) -> Result<Vec<CurrencyRate>, SourceError>;
}

// ── Partial-failure folds ─────────────────────────────────────────────────────

/// Fetch one chunk, converting any failure into `Unavailable`.
pub async fn fetch_chunk<S>(source: &S, instrument: &Instrument, chunk: Chunk) -> ChunkOutcome
where
    S: QuoteSource + ?Sized,
{
    match source.fetch_series(instrument, chunk).await {
        Ok(points) => ChunkOutcome::Fetched { chunk, points },
        Err(SourceError::NoData) => {
            warn!(
                "Couldn't get data in {}! It might be caused by the lack of data at this date.",
                chunk
            );
            ChunkOutcome::Unavailable { chunk }
        }
        Err(e) => {
            warn!("Couldn't get data in {}: {}", chunk, e);
            ChunkOutcome::Unavailable { chunk }
        }
    }
}

/// Fetch chunks one at a time, in order. A failed chunk never stops the loop.
pub async fn fetch_chunks<S>(source: &S, instrument: &Instrument, chunks: &[Chunk]) -> Vec<ChunkOutcome>
where
    S: QuoteSource + ?Sized,
{
    let mut outcomes = Vec::with_capacity(chunks.len());
    for &chunk in chunks {
        outcomes.push(fetch_chunk(source, instrument, chunk).await);
    }
    outcomes
}

/// Concatenate the given rate tables, skipping any that fail.
pub async fn fetch_rate_tables<S>(source: &S, tables: &[TableType]) -> Vec<CurrencyRate>
where
    S: QuoteSource + ?Sized,
{
    let mut rates = Vec::new();
    for &table in tables {
        match source.fetch_rate_table(table).await {
            Ok(rows) => {
                debug!("Table {}: {} currencies", table, rows.len());
                rates.extend(rows);
            }
            Err(e) => warn!("Couldn't get table {}: {}", table, e),
        }
    }
    rates
}
