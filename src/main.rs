mod calendar;
mod config;
mod models;
mod pipeline;
mod report;
mod request;
mod series;
mod source;
mod stats;
mod utils;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::request::{ReportRequest, requested_range};

const ABOUT: &str = "\
Financial report generator for NBP exchange rates and the price of gold.

Currency data are available from 02-01-2002, gold prices from 02-01-2013.
Words of a multi-word currency name are separated by '_'.";

#[derive(Parser)]
#[command(name = "quote-report", about = ABOUT, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Report for one currency (Polish name or code) or `gold`
    Report {
        /// Currency name, currency code or `gold`
        instrument: String,

        /// First day of the period (dd-mm-yyyy, default: today)
        #[arg(short, long)]
        begin: Option<String>,

        /// Last day of the period (dd-mm-yyyy, default: today)
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Current table of all currency rates
    Rates,

    /// List available currency names
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "quote_report=info,warn",
        1 => "quote_report=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let close_hour = config.report.market_close_hour;
    let pipeline = Pipeline::from_config(config)?;

    match cli.command {
        Command::Report { instrument, begin, end } => {
            let _t = utils::Timer::start(format!("Report for {}", instrument));

            let range = requested_range(
                begin.as_deref(),
                end.as_deref(),
                Local::now().naive_local(),
                close_hour,
            )?;
            let directory = if instrument.eq_ignore_ascii_case("gold") {
                Vec::new()
            } else {
                pipeline.currency_directory().await
            };
            let request = ReportRequest::build(&instrument, range, &directory)?;

            let stats = pipeline.run_report(&request).await?;
            info!(
                "Done: {} chunks ({} without data), {} points, {} in period",
                stats.chunks, stats.unavailable_chunks, stats.points, stats.visible_points
            );
            info!("Report: {}", stats.report_path.display());
        }

        Command::Rates => {
            let _t = utils::Timer::start("Currency table");
            let n = pipeline.run_rate_table().await?;
            info!("Done: {} currencies", n);
        }

        Command::List => {
            let directory = pipeline.currency_directory().await;
            if directory.is_empty() {
                println!("No currencies available: the rate tables could not be fetched.");
            } else {
                println!("Available currencies:");
                for rate in &directory {
                    println!("  * {}", rate.name);
                }
            }
        }
    }

    Ok(())
}
