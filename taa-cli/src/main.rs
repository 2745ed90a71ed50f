//! TAA CLI — daily allocation signal and historical backtest.
//!
//! Commands:
//! - `signal` — compute today's and yesterday's allocation, print the report,
//!   deliver it to every Telegram destination
//! - `backtest` — replay the full history, print summary statistics, write
//!   `cumulative.csv` and `summary.json` per configuration
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only the
//! report or the summary.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use taa_core::config::StrategyConfig;
use taa_core::data::{CsvPriceFile, PriceProvider, YahooProvider};
use taa_runner::{
    deliver_all, last_settled_date, load_for_config, lookback_start, render_backtest_summary,
    render_signal_report, run_many, settled_history, ArtifactWriter, LiveSignal,
    TelegramNotifier, TelegramSettings,
};

/// First date of the default backtest range.
const DEFAULT_BACKTEST_START: &str = "2004-11-18";

#[derive(Parser)]
#[command(
    name = "taa",
    about = "Hysteresis-band multi-window tactical asset allocation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the daily signal and deliver the report.
    Signal {
        /// Path to a TOML strategy config. Defaults to the reference strategy.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read closes from a wide CSV file instead of Yahoo Finance.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Print the report without delivering it.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Backtest over the full history.
    Backtest {
        /// Path to a TOML strategy config. Defaults to the reference strategy.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read closes from a wide CSV file instead of Yahoo Finance.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = DEFAULT_BACKTEST_START)]
        start: String,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Band percentage override. Repeat to backtest several bands in parallel.
        #[arg(long = "band")]
        bands: Vec<f64>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Signal {
            config,
            prices,
            dry_run,
        } => run_signal(config, prices, dry_run),
        Commands::Backtest {
            config,
            prices,
            start,
            end,
            bands,
            output_dir,
        } => run_backtest_cmd(config, prices, start, end, bands, output_dir),
    }
}

fn load_config(path: Option<&Path>) -> Result<StrategyConfig> {
    let config = match path {
        Some(path) => StrategyConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StrategyConfig::reference(),
    };
    config.validate().context("invalid strategy configuration")?;
    info!(strategy = %config.name, fingerprint = %config.fingerprint(), "configuration loaded");
    Ok(config)
}

fn provider(prices: Option<&Path>) -> Result<Box<dyn PriceProvider>> {
    let provider: Box<dyn PriceProvider> = match prices {
        Some(path) => Box::new(
            CsvPriceFile::open(path)
                .with_context(|| format!("failed to read prices {}", path.display()))?,
        ),
        None => Box::new(YahooProvider::new()?),
    };
    Ok(provider)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn run_signal(config: Option<PathBuf>, prices: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let provider = provider(prices.as_deref())?;
    // An offline file is replayed in full. The live fetch covers the lookback
    // and ends at the last session that has closed.
    let history = match prices {
        Some(_) => load_for_config(provider.as_ref(), &config, NaiveDate::MIN, NaiveDate::MAX)
            .context("failed to load price history")?,
        None => {
            let last_settled = last_settled_date(chrono::Utc::now());
            let start = lookback_start(last_settled);
            let fetched = load_for_config(provider.as_ref(), &config, start, last_settled)
                .context("failed to load price history")?;
            settled_history(&fetched, last_settled)
        }
    };

    let signal = LiveSignal::compute(&config, &history)?;
    let report = render_signal_report(&signal);
    println!("{report}");

    if dry_run {
        info!("dry run, delivery skipped");
        return Ok(());
    }

    let settings = TelegramSettings::from_env()?;
    let notifier = TelegramNotifier::new(settings.token.clone())?;
    let outcomes = deliver_all(&notifier, &settings.destinations, &report);
    let failed: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().map(|e| format!("{}: {e}", o.destination)))
        .collect();
    if !failed.is_empty() {
        bail!(
            "delivery failed for {} of {} destinations ({})",
            failed.len(),
            outcomes.len(),
            failed.join("; ")
        );
    }
    info!(destinations = outcomes.len(), "report delivered");
    Ok(())
}

fn run_backtest_cmd(
    config: Option<PathBuf>,
    prices: Option<PathBuf>,
    start: String,
    end: Option<String>,
    bands: Vec<f64>,
    output_dir: PathBuf,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let start = parse_date(&start)?;
    let end = match end {
        Some(end) => parse_date(&end)?,
        None => chrono::Local::now().date_naive(),
    };
    if end < start {
        bail!("end date {end} is before start date {start}");
    }

    let configs: Vec<StrategyConfig> = if bands.is_empty() {
        vec![config]
    } else {
        bands.iter().map(|&b| config.with_band_pct(b)).collect()
    };
    for config in &configs {
        config
            .validate()
            .with_context(|| format!("invalid band {}", config.band_pct))?;
    }

    let provider = provider(prices.as_deref())?;
    let history = load_for_config(provider.as_ref(), &configs[0], start, end)
        .context("failed to load price history")?;

    let writer = ArtifactWriter::new(&output_dir)?;
    for result in run_many(&configs, &history, Some(start)) {
        let result = result?;
        println!("{}", render_backtest_summary(&result));
        let paths = writer.write(&result)?;
        println!("Artifacts saved to: {}", paths.dir.display());
    }
    Ok(())
}
