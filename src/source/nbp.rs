//! NBP (Narodowy Bank Polski) public web API.
//!
//! Endpoints used:
//! - `exchangerates/rates/{table}/{code}/{begin}/{end}`: mid rates of one currency
//! - `exchangerates/rates/{table}/{code}/{date}`: single-day form
//! - `cenyzlota/{begin}/{end}` and `cenyzlota/{date}`: gold price per gram
//! - `exchangerates/tables/{table}`: latest published table
//!
//! Missing data is answered with 404.

use crate::config::SourceConfig;
use crate::models::{Chunk, CurrencyRate, Instrument, QuotePoint, TableType};
use crate::source::http_client::HttpClient;
use crate::source::{QuoteSource, SourceError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use url::Url;

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: Vec<RateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateEntry {
    effective_date: NaiveDate,
    mid: f64,
}

#[derive(Debug, Deserialize)]
struct GoldEntry {
    data: NaiveDate,
    cena: f64,
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    rates: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    currency: String,
    code: String,
    mid: f64,
}

pub fn parse_rates(body: &str) -> Result<Vec<QuotePoint>, SourceError> {
    let resp: RatesResponse = serde_json::from_str(body)?;
    Ok(sorted(
        resp.rates
            .into_iter()
            .map(|r| QuotePoint::new(r.effective_date, r.mid))
            .collect(),
    ))
}

pub fn parse_gold(body: &str) -> Result<Vec<QuotePoint>, SourceError> {
    let entries: Vec<GoldEntry> = serde_json::from_str(body)?;
    Ok(sorted(
        entries
            .into_iter()
            .map(|g| QuotePoint::new(g.data, g.cena))
            .collect(),
    ))
}

pub fn parse_table(body: &str, table: TableType) -> Result<Vec<CurrencyRate>, SourceError> {
    let tables: Vec<TableResponse> = serde_json::from_str(body)?;
    let latest = tables.into_iter().next().ok_or(SourceError::NoData)?;
    Ok(latest
        .rates
        .into_iter()
        .map(|r| CurrencyRate {
            name: r.currency,
            code: r.code,
            mid: r.mid,
            table,
        })
        .collect())
}

fn sorted(mut points: Vec<QuotePoint>) -> Vec<QuotePoint> {
    points.sort_by_key(|p| p.date);
    points
}

// ── Source ────────────────────────────────────────────────────────────────────

pub struct NbpSource {
    client: HttpClient,
    base_url: Url,
}

impl NbpSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let base = config.base_url.trim_end_matches('/');
        let base_url =
            Url::parse(base).map_err(|_| SourceError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl(config.base_url.clone()));
        }
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url,
        })
    }

    /// Base URL with `segments` appended and JSON output requested.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut().append_pair("format", "json");
        url
    }

    /// URL for one chunk; single-day chunks use the single-date form.
    pub fn series_url(&self, instrument: &Instrument, chunk: Chunk) -> Url {
        let begin = chunk.begin.format("%Y-%m-%d").to_string();
        let end = chunk.end.format("%Y-%m-%d").to_string();
        let dates: Vec<&str> = if chunk.is_single_day() {
            vec![end.as_str()]
        } else {
            vec![begin.as_str(), end.as_str()]
        };

        match instrument {
            Instrument::Currency { code, table, .. } => {
                let code = code.to_lowercase();
                let mut segments = vec!["exchangerates", "rates", table.letter(), code.as_str()];
                segments.extend(dates);
                self.endpoint(&segments)
            }
            Instrument::Gold => {
                let mut segments = vec!["cenyzlota"];
                segments.extend(dates);
                self.endpoint(&segments)
            }
        }
    }
}

#[async_trait]
impl QuoteSource for NbpSource {
    async fn fetch_series(
        &self,
        instrument: &Instrument,
        chunk: Chunk,
    ) -> Result<Vec<QuotePoint>, SourceError> {
        let url = self.series_url(instrument, chunk);
        let body = self.client.get_text(&url).await?;

        let points = match instrument {
            Instrument::Currency { .. } => parse_rates(&body)?,
            Instrument::Gold => parse_gold(&body)?,
        };
        debug!("{} {}: {} points", instrument.display_name(), chunk, points.len());
        Ok(points)
    }

    async fn fetch_rate_table(&self, table: TableType) -> Result<Vec<CurrencyRate>, SourceError> {
        let table_name = table.to_string();
        let url = self.endpoint(&["exchangerates", "tables", table_name.as_str()]);
        let body = self.client.get_text(&url).await?;
        parse_table(&body, table)
    }
}
