use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Remote quote source (NBP web API)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Where artifacts are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_setup_dir")]
    pub setup_dir: PathBuf,

    #[serde(default = "default_img_dir")]
    pub img_dir: PathBuf,

    /// Rendered HTML pages are written here.
    #[serde(default = "default_forms_dir")]
    pub forms_dir: PathBuf,

    /// Prefix used for image references inside rendered pages.
    #[serde(default = "default_image_href_prefix")]
    pub image_href_prefix: String,
}

/// Windowing and formatting knobs for the report
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_market_close_hour")]
    pub market_close_hour: u32,

    #[serde(default = "default_min_window_days")]
    pub min_window_days: i64,

    #[serde(default = "default_window_step_days")]
    pub window_step_days: i64,

    #[serde(default = "default_trailing_points")]
    pub trailing_points: usize,

    #[serde(default = "default_precision_threshold")]
    pub precision_threshold: f64,

    /// Decimals when the first visible value is at or above the threshold.
    #[serde(default = "default_coarse_decimals")]
    pub coarse_decimals: usize,

    #[serde(default = "default_fine_decimals")]
    pub fine_decimals: usize,

    #[serde(default = "default_currency_unit")]
    pub currency_unit: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://api.nbp.pl/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    150
}
fn default_jitter_ms() -> u64 {
    100
}
fn default_user_agent() -> String {
    "quote-report/0.1 (monthly rate and gold price reports)".to_string()
}
fn default_setup_dir() -> PathBuf {
    PathBuf::from("setup")
}
fn default_img_dir() -> PathBuf {
    PathBuf::from("img")
}
fn default_forms_dir() -> PathBuf {
    PathBuf::from("forms")
}
fn default_image_href_prefix() -> String {
    "../img".to_string()
}
fn default_market_close_hour() -> u32 {
    16
}
fn default_min_window_days() -> i64 {
    155
}
fn default_window_step_days() -> i64 {
    5
}
fn default_trailing_points() -> usize {
    5
}
fn default_precision_threshold() -> f64 {
    0.009
}
fn default_coarse_decimals() -> usize {
    2
}
fn default_fine_decimals() -> usize {
    3
}
fn default_currency_unit() -> String {
    "zł".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            jitter_ms: default_jitter_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            setup_dir: default_setup_dir(),
            img_dir: default_img_dir(),
            forms_dir: default_forms_dir(),
            image_href_prefix: default_image_href_prefix(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            market_close_hour: default_market_close_hour(),
            min_window_days: default_min_window_days(),
            window_step_days: default_window_step_days(),
            trailing_points: default_trailing_points(),
            precision_threshold: default_precision_threshold(),
            coarse_decimals: default_coarse_decimals(),
            fine_decimals: default_fine_decimals(),
            currency_unit: default_currency_unit(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("QUOTE_REPORT").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_report_conventions() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.report.min_window_days, 155);
        assert_eq!(cfg.report.window_step_days, 5);
        assert_eq!(cfg.report.market_close_hour, 16);
        assert_eq!(cfg.report.currency_unit, "zł");
        assert_eq!(cfg.output.setup_dir, PathBuf::from("setup"));
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "[report]\ntrailing_points = 10\nfine_decimals = 4\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let app: AppConfig = cfg.try_deserialize().unwrap();
        assert_eq!(app.report.trailing_points, 10);
        assert_eq!(app.report.fine_decimals, 4);
        assert_eq!(app.report.coarse_decimals, 2);
        assert_eq!(app.report.min_window_days, 155);
        assert_eq!(app.source.base_url, "https://api.nbp.pl/api");
    }
}
