use serde::Serialize;

/// Exponential moving average series.
///
/// Seeded with the simple mean of the first `period` values and smoothed
/// with `k = 2 / (period + 1)` afterwards. Empty when fewer than `period`
/// values are available.
pub fn compute_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);
    let mut prev = seed;
    for &value in &values[period..] {
        prev = (value - prev) * k + prev;
        series.push(prev);
    }
    series
}

#[derive(Debug, Clone, Serialize)]
pub struct EmaValue {
    pub period: usize,
    pub value: Option<f64>,
    pub price_above: bool,
}

/// Latest value of every configured EMA period.
#[derive(Debug, Clone, Serialize)]
pub struct EmaSnapshot {
    pub values: Vec<EmaValue>,
}

impl EmaSnapshot {
    pub fn compute(closes: &[f64], periods: &[usize], current_price: f64) -> Self {
        let values = periods
            .iter()
            .map(|&period| {
                let value = compute_ema(closes, period).last().copied();
                EmaValue {
                    period,
                    value,
                    price_above: value.map_or(false, |ema| current_price >= ema),
                }
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, period: usize) -> Option<f64> {
        self.values
            .iter()
            .find(|entry| entry.period == period)
            .and_then(|entry| entry.value)
    }

    /// `(period, value)` for every usable EMA, in configured order.
    pub fn available(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().filter_map(|entry| match entry.value {
            Some(value) if value > 0.0 => Some((entry.period, value)),
            _ => None,
        })
    }
}
