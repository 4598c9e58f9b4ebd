//! Canned in-memory source for tests.

use crate::models::{Chunk, CurrencyRate, Instrument, QuotePoint, TableType};
use crate::source::{QuoteSource, SourceError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSource {
    points: Vec<QuotePoint>,
    failing: Vec<NaiveDate>,
    table_a: Option<Vec<CurrencyRate>>,
    table_b: Option<Vec<CurrencyRate>>,
    requested: Mutex<Vec<Chunk>>,
}

impl FakeSource {
    pub fn new(points: Vec<QuotePoint>) -> Self {
        Self { points, ..Self::default() }
    }

    /// Chunks containing `date` fail with a network-style error.
    pub fn failing_on(mut self, date: NaiveDate) -> Self {
        self.failing.push(date);
        self
    }

    pub fn with_table(mut self, table: TableType, rates: Vec<CurrencyRate>) -> Self {
        match table {
            TableType::A => self.table_a = Some(rates),
            TableType::B => self.table_b = Some(rates),
        }
        self
    }

    pub fn requested(&self) -> Vec<Chunk> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    async fn fetch_series(
        &self,
        _instrument: &Instrument,
        chunk: Chunk,
    ) -> Result<Vec<QuotePoint>, SourceError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(chunk);
        }
        if self.failing.iter().any(|d| *d >= chunk.begin && *d <= chunk.end) {
            return Err(SourceError::Status { status: 500, url: chunk.to_string() });
        }
        let points: Vec<QuotePoint> = self
            .points
            .iter()
            .filter(|p| p.date >= chunk.begin && p.date <= chunk.end)
            .copied()
            .collect();
        if points.is_empty() {
            return Err(SourceError::NoData);
        }
        Ok(points)
    }

    async fn fetch_rate_table(&self, table: TableType) -> Result<Vec<CurrencyRate>, SourceError> {
        let rates = match table {
            TableType::A => self.table_a.clone(),
            TableType::B => self.table_b.clone(),
        };
        rates.ok_or(SourceError::NoData)
    }
}
