//! Pipeline orchestrator: ties source → series → statistics → output together.
//!
//! ## Run modes
//!
//! `run_report()`: report for one instrument:
//!   1. Widen the requested range and split it into month chunks
//!   2. Fetch the chunks one after another; a failed chunk counts as empty
//!   3. Stitch the series, cut the visible window, compute the figures
//!   4. Write charts, the price table, the JSON payload and the HTML pages
//!
//! `run_rate_table()`: current rates of every published currency (tables A and B).

use crate::calendar::{self, WindowPolicy};
use crate::config::AppConfig;
use crate::models::{CurrencyRate, NO_DATA, TablePayload, TableType};
use crate::report::chart::{ChartRenderer, SvgChartRenderer, render_report_charts};
use crate::report::output::{
    html_table, read_table, write_currency_table, write_json, write_price_table,
};
use crate::report::template::{CurrencyTablePage, PriceTablePage, ReportPage, write_page};
use crate::report::{ImageRefs, ReportData, build_payload};
use crate::request::ReportRequest;
use crate::series;
use crate::source::{NbpSource, QuoteSource, fetch_chunks, fetch_rate_tables};
use crate::stats::PrecisionPolicy;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub const PRICE_TABLE_FILE: &str = "priceTable.csv";
pub const CURRENCY_TABLE_FILE: &str = "currencyTable.csv";
pub const PAYLOAD_FILE: &str = "generalData.json";
pub const PRICE_TABLE_PAYLOAD_FILE: &str = "priceTableData.json";
pub const CURRENCY_TABLE_PAYLOAD_FILE: &str = "currencyTableData.json";

const ALL_TABLES: [TableType; 2] = [TableType::A, TableType::B];

pub struct Pipeline<S> {
    config: AppConfig,
    source: S,
    charts: Box<dyn ChartRenderer>,
}

impl Pipeline<NbpSource> {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let source = NbpSource::new(&config.source).context("Failed to build NBP source")?;
        Ok(Self::new(config, source))
    }
}

impl<S: QuoteSource> Pipeline<S> {
    pub fn new(config: AppConfig, source: S) -> Self {
        Self {
            config,
            source,
            charts: Box::new(SvgChartRenderer),
        }
    }

    /// Every currency of tables A and B, in table order.
    pub async fn currency_directory(&self) -> Vec<CurrencyRate> {
        fetch_rate_tables(&self.source, &ALL_TABLES).await
    }

    pub async fn run_report(&self, request: &ReportRequest) -> Result<ReportStats> {
        let report_cfg = &self.config.report;
        let out = &self.config.output;
        let instrument = &request.instrument;

        // ── 1. Partition ──────────────────────────────────────────────────────
        let chunks = calendar::partition(request.range, WindowPolicy::from(report_cfg));
        info!(
            "=== Step 1: {} for {} → {} monthly chunks ===",
            instrument.display_name(),
            request.range,
            chunks.len()
        );

        // ── 2. Fetch sequentially ─────────────────────────────────────────────
        info!("=== Step 2: Fetching quotes ===");
        let outcomes = fetch_chunks(&self.source, instrument, &chunks).await;

        // ── 3. Assemble + analyse ─────────────────────────────────────────────
        let assembled = series::assemble(&outcomes);
        let data = ReportData::analyze(
            &assembled,
            request.range.begin,
            report_cfg.trailing_points,
            PrecisionPolicy::from(report_cfg),
        );
        info!(
            "=== Step 3: {} points fetched, {} visible, {} chunks without data ===",
            assembled.points.len(),
            data.visible.len(),
            assembled.unavailable_chunks
        );

        // ── 4. Output ─────────────────────────────────────────────────────────
        info!("=== Step 4: Writing charts, tables and report ===");
        let unit = report_cfg.currency_unit.as_str();
        render_report_charts(self.charts.as_ref(), &out.img_dir, &data, unit)
            .context("Chart rendering failed")?;

        let name = instrument.display_name();
        let code = instrument.code().unwrap_or(NO_DATA);

        let price_csv = out.setup_dir.join(PRICE_TABLE_FILE);
        write_price_table(&price_csv, &data.visible)?;
        let table = html_table(&read_table(&price_csv)?)?;
        let table_payload = TablePayload {
            table: table.clone(),
            name: Some(name.to_string()),
            code: Some(code.to_string()),
        };
        write_json(&out.setup_dir.join(PRICE_TABLE_PAYLOAD_FILE), &table_payload)?;
        write_page(
            &out.forms_dir,
            "priceTable",
            &PriceTablePage { name, code, table: &table },
        )?;

        let payload = build_payload(
            instrument,
            &data,
            unit,
            &ImageRefs::with_prefix(&out.image_href_prefix),
        );
        write_json(&out.setup_dir.join(PAYLOAD_FILE), &payload)?;
        let report_path = write_page(&out.forms_dir, "report", &ReportPage { general: &payload })?;

        Ok(ReportStats {
            chunks: chunks.len(),
            unavailable_chunks: assembled.unavailable_chunks,
            points: assembled.points.len(),
            visible_points: data.visible.len(),
            report_path,
        })
    }

    pub async fn run_rate_table(&self) -> Result<usize> {
        let out = &self.config.output;
        let rates = self.currency_directory().await;
        info!("{} currencies in tables A and B", rates.len());

        let csv_path = out.setup_dir.join(CURRENCY_TABLE_FILE);
        write_currency_table(&csv_path, &rates)?;
        let payload = TablePayload {
            table: html_table(&read_table(&csv_path)?)?,
            name: None,
            code: None,
        };
        write_json(&out.setup_dir.join(CURRENCY_TABLE_PAYLOAD_FILE), &payload)?;
        write_page(
            &out.forms_dir,
            "currencyTable",
            &CurrencyTablePage { table: &payload.table },
        )?;

        Ok(rates.len())
    }
}

#[derive(Debug)]
pub struct ReportStats {
    pub chunks: usize,
    pub unavailable_chunks: usize,
    pub points: usize,
    pub visible_points: usize,
    pub report_path: PathBuf,
}
