//! Delimited tables, HTML table fragments and JSON payload files.

use crate::models::{CurrencyRate, QuotePoint};
use anyhow::{Context, Result};
use askama::Template;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

pub const DELIMITER: u8 = b';';

/// Headers plus string cells, as read back from a delimited file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    Ok(())
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    ensure_parent(path)?;
    csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))
}

/// `Date;Price` rows of the visible window.
pub fn write_price_table(path: &Path, points: &[QuotePoint]) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["Date", "Price"])?;
    for p in points {
        wtr.write_record([p.date.to_string(), p.value.to_string()])?;
    }
    wtr.flush()?;
    debug!("{} price rows written to {:?}", points.len(), path);
    Ok(())
}

/// `Currency name;Currency code;Rate` rows of the published tables.
pub fn write_currency_table(path: &Path, rates: &[CurrencyRate]) -> Result<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["Currency name", "Currency code", "Rate"])?;
    for r in rates {
        wtr.write_record([r.name.clone(), r.code.clone(), r.mid.to_string()])?;
    }
    wtr.flush()?;
    debug!("{} currency rows written to {:?}", rates.len(), path);
    Ok(())
}

pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(Table { headers, rows })
}

#[derive(Template)]
#[template(path = "partials/table.html")]
struct TableFragment<'a> {
    table: &'a Table,
}

/// HTML `<table>` fragment with a leading row-index column.
pub fn html_table(table: &Table) -> Result<String> {
    Ok(TableFragment { table }.render()?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("Failed to write JSON to {:?}", path))?;
    Ok(())
}
