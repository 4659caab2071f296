use serde::Serialize;

use crate::analysis::stats::{mean, population_std_dev};
use crate::config::IndicatorParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    AboveUpper,
    NearUpper,
    Middle,
    NearLower,
    BelowLower,
}

#[derive(Debug, Clone, Serialize)]
pub struct BollingerState {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub std_dev: f64,
    pub bandwidth: f64,
    pub percent_b: f64,
    pub average_bandwidth: f64,
    pub squeeze: bool,
    pub position: BandPosition,
}

struct Bands {
    upper: f64,
    middle: f64,
    lower: f64,
    std_dev: f64,
}

fn bands(window: &[f64], k: f64) -> Bands {
    let middle = mean(window);
    let std_dev = population_std_dev(window);
    Bands {
        upper: middle + k * std_dev,
        middle,
        lower: middle - k * std_dev,
        std_dev,
    }
}

fn bandwidth(bands: &Bands) -> f64 {
    if bands.middle == 0.0 {
        0.0
    } else {
        (bands.upper - bands.lower) / bands.middle
    }
}

/// Bollinger Bands over the trailing window plus a squeeze check against
/// the mean bandwidth of every full window in the history.
pub fn compute_bollinger(closes: &[f64], params: &IndicatorParams) -> Option<BollingerState> {
    let period = params.bollinger_period;
    if period == 0 || closes.len() < period {
        return None;
    }
    let k = params.bollinger_std_dev;

    let current = bands(&closes[closes.len() - period..], k);
    let current_bandwidth = bandwidth(&current);

    let history: Vec<f64> = closes
        .windows(period)
        .map(|window| bandwidth(&bands(window, k)))
        .collect();
    let average_bandwidth = mean(&history);

    let squeeze = if average_bandwidth > 0.0 {
        current_bandwidth < params.squeeze_ratio * average_bandwidth
    } else {
        current_bandwidth <= 0.0
    };

    let price = closes[closes.len() - 1];
    let width = current.upper - current.lower;
    let percent_b = if width > 0.0 {
        (price - current.lower) / width
    } else {
        0.5
    };

    let position = if percent_b > 1.0 {
        BandPosition::AboveUpper
    } else if percent_b >= 0.8 {
        BandPosition::NearUpper
    } else if percent_b < 0.0 {
        BandPosition::BelowLower
    } else if percent_b <= 0.2 {
        BandPosition::NearLower
    } else {
        BandPosition::Middle
    };

    Some(BollingerState {
        upper: current.upper,
        middle: current.middle,
        lower: current.lower,
        std_dev: current.std_dev,
        bandwidth: current_bandwidth,
        percent_b,
        average_bandwidth,
        squeeze,
        position,
    })
}
