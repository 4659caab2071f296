use serde::Serialize;

use crate::analysis::ema::EmaSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    StrongUptrend,
    Uptrend,
    WeakUptrend,
    Ranging,
    WeakDowntrend,
    Downtrend,
    StrongDowntrend,
}

impl TrendDirection {
    pub fn is_bullish(self) -> bool {
        matches!(
            self,
            TrendDirection::StrongUptrend | TrendDirection::Uptrend | TrendDirection::WeakUptrend
        )
    }

    pub fn is_bearish(self) -> bool {
        matches!(
            self,
            TrendDirection::StrongDowntrend
                | TrendDirection::Downtrend
                | TrendDirection::WeakDowntrend
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::StrongUptrend => "strong uptrend",
            TrendDirection::Uptrend => "uptrend",
            TrendDirection::WeakUptrend => "weak uptrend",
            TrendDirection::Ranging => "ranging",
            TrendDirection::WeakDowntrend => "weak downtrend",
            TrendDirection::Downtrend => "downtrend",
            TrendDirection::StrongDowntrend => "strong downtrend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaAlignment {
    PerfectlyBullish,
    Bullish,
    Mixed,
    Bearish,
    PerfectlyBearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingBias {
    Long,
    Neutral,
    Short,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendState {
    pub direction: TrendDirection,
    pub alignment: EmaAlignment,
    pub strength: u8,
    pub bias: TradingBias,
    pub bias_reason: String,
    pub above_count: usize,
    pub total_emas: usize,
}

/// Classify trend from where price sits relative to the available EMAs.
///
/// Bands are checked from most bullish to most bearish with strict upper
/// bounds, so a ratio sitting exactly on a boundary lands in the band
/// closer to ranging.
pub fn classify_trend(current_price: f64, emas: &EmaSnapshot) -> TrendState {
    let values: Vec<f64> = emas.available().map(|(_, value)| value).collect();
    let total_emas = values.len();
    let above_count = values.iter().filter(|&&ema| current_price >= ema).count();
    let ratio = if total_emas == 0 {
        0.5
    } else {
        above_count as f64 / total_emas as f64
    };

    let stacked = total_emas >= 2;
    let bullish_stack = stacked && values.windows(2).all(|pair| pair[0] >= pair[1]);
    let bearish_stack = stacked && values.windows(2).all(|pair| pair[0] <= pair[1]);

    let (alignment, direction) = if bullish_stack && above_count == total_emas {
        (EmaAlignment::PerfectlyBullish, TrendDirection::StrongUptrend)
    } else if bearish_stack && above_count == 0 {
        (EmaAlignment::PerfectlyBearish, TrendDirection::StrongDowntrend)
    } else if ratio > 0.8 {
        (EmaAlignment::Bullish, TrendDirection::Uptrend)
    } else if ratio > 0.6 {
        (EmaAlignment::Bullish, TrendDirection::WeakUptrend)
    } else if ratio >= 0.4 {
        (EmaAlignment::Mixed, TrendDirection::Ranging)
    } else if ratio >= 0.2 {
        (EmaAlignment::Bearish, TrendDirection::WeakDowntrend)
    } else {
        (EmaAlignment::Bearish, TrendDirection::Downtrend)
    };

    let raw_strength = if direction.is_bullish() {
        40.0 + 60.0 * ratio
    } else if direction.is_bearish() {
        40.0 + 60.0 * (1.0 - ratio)
    } else {
        30.0 * (1.0 - 2.0 * (ratio - 0.5).abs())
    };
    let strength = raw_strength.clamp(0.0, 100.0).round() as u8;

    let bias = match direction {
        TrendDirection::StrongUptrend | TrendDirection::Uptrend => TradingBias::Long,
        TrendDirection::StrongDowntrend | TrendDirection::Downtrend => TradingBias::Short,
        TrendDirection::WeakUptrend | TrendDirection::Ranging | TrendDirection::WeakDowntrend => {
            TradingBias::Neutral
        }
    };

    let stack_note = match alignment {
        EmaAlignment::PerfectlyBullish => "EMAs stacked bullish",
        EmaAlignment::PerfectlyBearish => "EMAs stacked bearish",
        EmaAlignment::Bullish | EmaAlignment::Mixed | EmaAlignment::Bearish => "EMAs not stacked",
    };
    let bias_reason = match bias {
        TradingBias::Long => format!(
            "Price above {above_count}/{total_emas} EMAs; {stack_note}; favour longs"
        ),
        TradingBias::Short => format!(
            "Price above only {above_count}/{total_emas} EMAs; {stack_note}; favour shorts"
        ),
        TradingBias::Neutral => format!(
            "Price above {above_count}/{total_emas} EMAs; {stack_note}; no directional edge"
        ),
    };

    TrendState {
        direction,
        alignment,
        strength,
        bias,
        bias_reason,
        above_count,
        total_emas,
    }
}
