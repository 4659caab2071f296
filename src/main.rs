use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use level_confluence::config::{AppConfig, OutputFormat};
use level_confluence::data::{RthWindow, Timeframe};
use level_confluence::loader::{filter_rth, load_bars_from_csv, validate_series};
use level_confluence::output::{print_report, render_json};
use level_confluence::{analyze, score_levels};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_logging(&config.log_level);
    run(&config)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(config: &AppConfig) -> Result<()> {
    let input_path = &config.input_path;
    if !Path::new(input_path).exists() {
        bail!("input file {:?} does not exist", input_path);
    }

    let timeframe: Timeframe = config.timeframe.parse()?;
    let tz: Tz = config
        .timezone
        .parse()
        .map_err(|err| anyhow::anyhow!("invalid timezone {:?}: {err}", config.timezone))?;
    let engine = config.engine_config();
    engine.validate().context("invalid engine settings")?;

    let mut bars = load_bars_from_csv(input_path, tz)
        .with_context(|| format!("failed to load input data from {:?}", input_path))?;
    if config.rth_only {
        if timeframe != Timeframe::Intraday {
            warn!(%timeframe, "regular trading hours filter applied to non-intraday bars");
        }
        bars = filter_rth(&bars, RthWindow::default());
        if bars.is_empty() {
            bail!("no bars remain after applying the regular trading hours filter");
        }
    }
    validate_series(&bars, engine.required_bars())?;

    if let (Some(start), Some(end)) = (bars.first(), bars.last()) {
        info!(
            bars = bars.len(),
            start = %start.timestamp.format("%Y-%m-%d %H:%M"),
            end = %end.timestamp.format("%Y-%m-%d %H:%M"),
            "loaded series"
        );
    }

    let market = analyze(&bars, &config.symbol, timeframe, &engine)
        .with_context(|| format!("analysis failed for {}", config.symbol))?;
    let levels = score_levels(&market, &engine);

    match config.format {
        OutputFormat::Table => print_report(&market, &levels),
        OutputFormat::Json => println!("{}", render_json(&market, &levels)?),
    }

    Ok(())
}
