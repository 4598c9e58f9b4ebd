//! HTML pages rendered from the templates under `templates/`.
//!
//! Values are HTML-escaped by the template engine; table fragments are
//! already rendered markup and are inserted with `|safe`.

use crate::models::ReportPayload;
use crate::report::output::ensure_parent;
use anyhow::{Context, Result};
use askama::Template;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Template)]
#[template(path = "report_form.html")]
pub struct ReportPage<'a> {
    pub general: &'a ReportPayload,
}

#[derive(Template)]
#[template(path = "price_table_form.html")]
pub struct PriceTablePage<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub table: &'a str,
}

#[derive(Template)]
#[template(path = "currency_table_form.html")]
pub struct CurrencyTablePage<'a> {
    pub table: &'a str,
}

/// Render `page` into `<dir>/<name>.html` and return the path.
pub fn write_page<T: Template>(dir: &Path, name: &str, page: &T) -> Result<PathBuf> {
    let html = page
        .render()
        .with_context(|| format!("Failed to render page '{}'", name))?;
    let path = dir.join(format!("{}.html", name));
    ensure_parent(&path)?;
    std::fs::write(&path, html).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Report saved to: {}", path.display());
    Ok(path)
}
