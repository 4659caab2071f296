use clap::{Parser, ValueEnum};
use serde::Serialize;
use thiserror::Error;

/// Indicator periods and thresholds.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorParams {
    pub ema_periods: Vec<usize>,
    /// EMA used as the overextension anchor.
    pub medium_ema_period: usize,
    pub atr_period: usize,
    /// ATR% below this is a low-volatility regime.
    pub low_volatility_pct: f64,
    /// ATR% above this is a high-volatility regime.
    pub high_volatility_pct: f64,
    pub low_volatility_multiplier: f64,
    pub medium_volatility_multiplier: f64,
    pub high_volatility_multiplier: f64,
    /// Added to every strength threshold in a high-volatility regime.
    pub high_volatility_threshold_adjustment: f64,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub squeeze_ratio: f64,
    /// Trailing share of the series whose swings count as recent.
    pub recent_fraction: f64,
    pub fibonacci_min_bars: usize,
    pub volume_buckets: usize,
    pub volume_node_multiple: f64,
    pub max_volume_nodes: usize,
    pub moderate_atr_distance: f64,
    pub overextended_atr_distance: f64,
    pub extreme_atr_distance: f64,
    pub min_bars: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_periods: vec![9, 21, 65, 100, 200],
            medium_ema_period: 21,
            atr_period: 14,
            low_volatility_pct: 1.5,
            high_volatility_pct: 3.0,
            low_volatility_multiplier: 1.0,
            medium_volatility_multiplier: 1.5,
            high_volatility_multiplier: 2.0,
            high_volatility_threshold_adjustment: 1.0,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            squeeze_ratio: 0.8,
            recent_fraction: 0.2,
            fibonacci_min_bars: 20,
            volume_buckets: 20,
            volume_node_multiple: 1.5,
            max_volume_nodes: 5,
            moderate_atr_distance: 1.5,
            overextended_atr_distance: 2.5,
            extreme_atr_distance: 3.5,
            min_bars: 20,
        }
    }
}

/// Confluence factor weights and level filters.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringParams {
    /// Shared band for touch counting, factor matching and grouping.
    pub tolerance_pct: f64,
    pub points_per_touch: f64,
    pub max_touch_points: f64,
    pub ema_points: f64,
    pub volume_node_points: f64,
    pub round_number_points: f64,
    pub recency_points: f64,
    pub round_divisors: Vec<f64>,
    /// Levels closer than this to the current price are not actionable.
    pub min_distance_pct: f64,
    pub strong_threshold: f64,
    pub medium_threshold: f64,
    pub weak_threshold: f64,
    pub zone_width_factor: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            tolerance_pct: 0.5,
            points_per_touch: 1.0,
            max_touch_points: 4.0,
            ema_points: 2.0,
            volume_node_points: 2.0,
            round_number_points: 1.0,
            recency_points: 1.5,
            round_divisors: vec![100.0, 50.0, 25.0, 10.0, 5.0],
            min_distance_pct: 0.5,
            strong_threshold: 7.0,
            medium_threshold: 4.5,
            weak_threshold: 2.5,
            zone_width_factor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayParams {
    pub default_count: usize,
    pub expanded_count: usize,
    pub min_spacing_pct: f64,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            default_count: 3,
            expanded_count: 6,
            min_spacing_pct: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceParams {
    pub base_score: f64,
    pub trend_bonus: f64,
    pub two_sided_bonus: f64,
    pub normal_extension_bonus: f64,
    pub squeeze_penalty: f64,
    pub conflict_penalty: f64,
    pub conflict_distance_pct: f64,
    pub data_penalty: f64,
    pub min_bars_for_confidence: usize,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for ConfidenceParams {
    fn default() -> Self {
        Self {
            base_score: 50.0,
            trend_bonus: 10.0,
            two_sided_bonus: 15.0,
            normal_extension_bonus: 10.0,
            squeeze_penalty: 10.0,
            conflict_penalty: 15.0,
            conflict_distance_pct: 3.0,
            data_penalty: 10.0,
            min_bars_for_confidence: 100,
            floor: 30.0,
            ceiling: 100.0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroPeriod { name: &'static str },

    #[error("medium EMA period {period} is not one of the configured EMA periods")]
    MediumEmaMissing { period: usize },
}

/// Read-only options for one engine invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineConfig {
    pub indicators: IndicatorParams,
    pub scoring: ScoringParams,
    pub display: DisplayParams,
    pub confidence: ConfidenceParams,
}

impl EngineConfig {
    /// Fewest bars for which every mandatory indicator is defined.
    pub fn required_bars(&self) -> usize {
        let params = &self.indicators;
        params
            .min_bars
            .max(params.atr_period)
            .max(params.bollinger_period)
            .max(params.medium_ema_period)
    }

    /// Reject settings under which a mandatory indicator can never be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.indicators;
        for (name, period) in [
            ("atr_period", params.atr_period),
            ("bollinger_period", params.bollinger_period),
            ("medium_ema_period", params.medium_ema_period),
        ] {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }
        if !params.ema_periods.contains(&params.medium_ema_period) {
            return Err(ConfigError::MediumEmaMissing {
                period: params.medium_ema_period,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Command-line configuration for the confluence level tool.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Input CSV file path containing OHLCV data.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input_path: String,

    /// Instrument symbol used in the report.
    #[arg(short = 's', long, default_value = "UNKNOWN")]
    pub symbol: String,

    /// Bar interval (e.g. 5m, 1h, 1d, 1w).
    #[arg(short = 't', long, default_value = "1d")]
    pub timeframe: String,

    /// IANA time zone the CSV timestamps are recorded in.
    #[arg(long, default_value = "America/New_York")]
    pub timezone: String,

    /// Keep only regular-trading-hours bars (intraday data).
    #[arg(long, default_value_t = false)]
    pub rth_only: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// ATR period for volatility estimation.
    #[arg(long, default_value_t = 14)]
    pub atr_period: usize,

    /// Confluence tolerance band in percent of price.
    #[arg(long, default_value_t = 0.5)]
    pub tolerance_pct: f64,

    /// Levels shown per side in the default view.
    #[arg(long, default_value_t = 3)]
    pub display_count: usize,

    /// Levels shown per side in the expanded view.
    #[arg(long, default_value_t = 6)]
    pub expanded_count: usize,

    /// Minimum spacing between displayed levels in percent.
    #[arg(long, default_value_t = 1.5)]
    pub min_spacing_pct: f64,
}

impl AppConfig {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.indicators.atr_period = self.atr_period;
        config.scoring.tolerance_pct = self.tolerance_pct;
        config.display.default_count = self.display_count;
        config.display.expanded_count = self.expanded_count;
        config.display.min_spacing_pct = self.min_spacing_pct;
        config
    }
}
