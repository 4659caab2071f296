use serde::Serialize;

use crate::data::{Bar, Timeframe};

/// Retracement ratios with their confluence weights.
pub const FIB_RATIOS: [(f64, &str, f64); 5] = [
    (0.236, "23.6%", 1.0),
    (0.382, "38.2%", 1.5),
    (0.5, "50%", 1.5),
    (0.618, "61.8%", 2.0),
    (0.786, "78.6%", 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub label: &'static str,
    pub price: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FibonacciState {
    pub swing_high: f64,
    pub swing_high_date: String,
    pub swing_low: f64,
    pub swing_low_date: String,
    pub direction: SwingDirection,
    pub levels: Vec<FibLevel>,
    pub current_retracement: f64,
}

/// Retracement grid between the series' absolute high and low.
///
/// Only daily and weekly series with at least `min_bars` bars and a
/// non-zero range produce a grid.
pub fn compute_fibonacci(
    bars: &[Bar],
    timeframe: Timeframe,
    min_bars: usize,
) -> Option<FibonacciState> {
    if !timeframe.supports_fibonacci() || bars.len() < min_bars.max(1) {
        return None;
    }

    let mut high_idx = 0usize;
    let mut low_idx = 0usize;
    for (idx, bar) in bars.iter().enumerate() {
        if bar.high > bars[high_idx].high {
            high_idx = idx;
        }
        if bar.low < bars[low_idx].low {
            low_idx = idx;
        }
    }

    let high = bars[high_idx].high;
    let low = bars[low_idx].low;
    let range = high - low;
    if !range.is_finite() || range <= 0.0 {
        return None;
    }

    let direction = if low_idx < high_idx {
        SwingDirection::Up
    } else {
        SwingDirection::Down
    };

    let levels = FIB_RATIOS
        .iter()
        .map(|&(ratio, label, weight)| FibLevel {
            ratio,
            label,
            price: match direction {
                SwingDirection::Up => high - range * ratio,
                SwingDirection::Down => low + range * ratio,
            },
            weight,
        })
        .collect();

    let price = bars[bars.len() - 1].close;
    let retracement = match direction {
        SwingDirection::Up => (high - price) / range,
        SwingDirection::Down => (price - low) / range,
    };

    Some(FibonacciState {
        swing_high: high,
        swing_high_date: bars[high_idx].date.clone(),
        swing_low: low,
        swing_low_date: bars[low_idx].date.clone(),
        direction,
        levels,
        current_retracement: retracement.clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{bar, bars_from_closes};

    #[test]
    fn rising_series_retraces_down_from_the_high() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let bars = bars_from_closes(&closes);
        let fib = compute_fibonacci(&bars, Timeframe::Daily, 20).unwrap();
        assert_eq!(fib.direction, SwingDirection::Up);
        assert_eq!(fib.swing_high_date, bars[24].date);
        assert_eq!(fib.swing_low_date, bars[0].date);
        let range = fib.swing_high - fib.swing_low;
        assert!((fib.levels[3].price - (fib.swing_high - range * 0.618)).abs() < 1e-9);
        assert_eq!(fib.levels[3].weight, 2.0);
    }

    #[test]
    fn falling_series_measures_up_from_the_low() {
        let closes: Vec<f64> = (0..25).map(|i| 200.0 - i as f64).collect();
        let fib = compute_fibonacci(&bars_from_closes(&closes), Timeframe::Weekly, 20).unwrap();
        assert_eq!(fib.direction, SwingDirection::Down);
        assert!(fib.levels[0].price > fib.swing_low);
        assert!(fib.levels.windows(2).all(|pair| pair[0].price < pair[1].price));
    }

    #[test]
    fn retracement_is_clamped() {
        let mut bars = bars_from_closes(&(0..25).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        // Close far below the recorded low.
        bars[24] = bar(24, 124.0, 124.5, 123.5, 50.0);
        let fib = compute_fibonacci(&bars, Timeframe::Daily, 20).unwrap();
        assert!((0.0..=1.0).contains(&fib.current_retracement));
        assert_eq!(fib.current_retracement, 1.0);
    }

    #[test]
    fn intraday_and_short_series_are_skipped() {
        let bars = bars_from_closes(&(0..25).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        assert!(compute_fibonacci(&bars, Timeframe::Intraday, 20).is_none());
        assert!(compute_fibonacci(&bars[..10], Timeframe::Daily, 20).is_none());
        let flat = vec![bar(0, 1.0, 1.0, 1.0, 1.0); 25];
        assert!(compute_fibonacci(&flat, Timeframe::Daily, 20).is_none());
    }
}
