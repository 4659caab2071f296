use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::analysis::atr::{atr_state, AtrState};
use crate::analysis::bollinger::{compute_bollinger, BollingerState};
use crate::analysis::ema::EmaSnapshot;
use crate::analysis::fibonacci::{compute_fibonacci, FibonacciState};
use crate::analysis::overextension::{detect_overextension, OverextensionState};
use crate::analysis::swings::detect_swings;
use crate::analysis::trend::{classify_trend, TrendState};
use crate::analysis::volume_profile::{compute_volume_profile, VolumeProfile};
use crate::config::{ConfigError, EngineConfig};
use crate::data::{Bar, SwingPoint, Timeframe};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("insufficient data: need at least {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("bar {index} has a non-positive or non-finite close")]
    InvalidBar { index: usize },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub emas: EmaSnapshot,
    pub trend: TrendState,
    pub atr: AtrState,
    pub bollinger: BollingerState,
    pub swings: Vec<SwingPoint>,
    pub fibonacci: Option<FibonacciState>,
    pub volume_profile: VolumeProfile,
    pub overextension: OverextensionState,
}

/// Everything derived from one bar series.
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub bar_count: usize,
    pub indicators: IndicatorSet,
}

/// Compute the full indicator bundle for one instrument.
///
/// Either every mandatory indicator is produced or the call fails as a
/// whole; Fibonacci and the longer EMA periods are optional.
pub fn analyze(
    bars: &[Bar],
    symbol: &str,
    timeframe: Timeframe,
    config: &EngineConfig,
) -> Result<MarketAnalysis, AnalysisError> {
    config.validate()?;
    let required = config.required_bars();
    let insufficient = AnalysisError::InsufficientData {
        required,
        available: bars.len(),
    };
    if bars.len() < required {
        return Err(insufficient);
    }
    if let Some(index) = bars
        .iter()
        .position(|bar| !bar.close.is_finite() || bar.close <= 0.0)
    {
        return Err(AnalysisError::InvalidBar { index });
    }

    let params = &config.indicators;
    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let current_price = closes[closes.len() - 1];
    let previous = closes[closes.len() - 2];
    let price_change = current_price - previous;
    let price_change_percent = price_change / previous * 100.0;

    let emas = EmaSnapshot::compute(&closes, &params.ema_periods, current_price);
    let trend = classify_trend(current_price, &emas);

    let (Some(atr), Some(bollinger), Some(medium_ema)) = (
        atr_state(bars, params),
        compute_bollinger(&closes, params),
        emas.get(params.medium_ema_period),
    ) else {
        return Err(insufficient);
    };

    let swings = detect_swings(
        bars,
        timeframe.swing_window(),
        config.scoring.tolerance_pct,
        params.recent_fraction,
    );
    let fibonacci = compute_fibonacci(bars, timeframe, params.fibonacci_min_bars);
    let volume_profile = compute_volume_profile(
        bars,
        params.volume_buckets,
        params.volume_node_multiple,
        params.max_volume_nodes,
    );
    let overextension = detect_overextension(current_price, medium_ema, atr.atr, params);

    debug!(
        symbol,
        bars = bars.len(),
        swings = swings.len(),
        fibonacci = fibonacci.is_some(),
        volume_nodes = volume_profile.high_volume_nodes.len(),
        trend = ?trend.direction,
        atr = atr.atr,
        "indicators computed"
    );

    Ok(MarketAnalysis {
        symbol: symbol.to_string(),
        timeframe,
        current_price,
        price_change,
        price_change_percent,
        bar_count: bars.len(),
        indicators: IndicatorSet {
            emas,
            trend,
            atr,
            bollinger,
            swings,
            fibonacci,
            volume_profile,
            overextension,
        },
    })
}
