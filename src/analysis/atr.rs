use serde::Serialize;

use crate::analysis::ema::compute_ema;
use crate::config::IndicatorParams;
use crate::data::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtrState {
    pub atr: f64,
    pub atr_percent: f64,
    pub regime: VolatilityRegime,
    /// Scales ATR into level zone width.
    pub multiplier: f64,
    /// Added to strength thresholds when scoring levels.
    pub threshold_adjustment: f64,
}

/// True range of every bar; the first bar has no previous close.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    let mut true_ranges = Vec::with_capacity(bars.len());
    for (idx, bar) in bars.iter().enumerate() {
        let tr = if idx == 0 {
            bar.high - bar.low
        } else {
            let prev = &bars[idx - 1];
            let high_low = bar.high - bar.low;
            let high_close = (bar.high - prev.close).abs();
            let low_close = (bar.low - prev.close).abs();
            high_low.max(high_close).max(low_close)
        };
        true_ranges.push(tr.max(0.0));
    }
    true_ranges
}

/// Exponentially smoothed Average True Range series.
pub fn compute_atr(bars: &[Bar], period: usize) -> Vec<f64> {
    if bars.is_empty() || period == 0 {
        return Vec::new();
    }
    compute_ema(&true_ranges(bars), period)
}

/// Regime, zone multiplier and strength-threshold adjustment for an ATR%.
///
/// Both edges belong to the medium regime.
pub fn classify_regime(atr_percent: f64, params: &IndicatorParams) -> (VolatilityRegime, f64, f64) {
    if atr_percent < params.low_volatility_pct {
        (VolatilityRegime::Low, params.low_volatility_multiplier, 0.0)
    } else if atr_percent <= params.high_volatility_pct {
        (VolatilityRegime::Medium, params.medium_volatility_multiplier, 0.0)
    } else {
        (
            VolatilityRegime::High,
            params.high_volatility_multiplier,
            params.high_volatility_threshold_adjustment,
        )
    }
}

/// Latest ATR with its volatility regime. `None` when the series is too short.
pub fn atr_state(bars: &[Bar], params: &IndicatorParams) -> Option<AtrState> {
    let atr = compute_atr(bars, params.atr_period).last().copied()?;
    let close = bars.last()?.close;
    let atr_percent = if close > 0.0 { atr / close * 100.0 } else { 0.0 };

    let (regime, multiplier, threshold_adjustment) = classify_regime(atr_percent, params);

    Some(AtrState {
        atr,
        atr_percent,
        regime,
        multiplier,
        threshold_adjustment,
    })
}
