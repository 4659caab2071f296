use statrs::statistics::Statistics;

/// Absolute distance between `price` and `reference` as a percent of `reference`.
pub fn pct_distance(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return f64::INFINITY;
    }
    ((price - reference) / reference).abs() * 100.0
}

/// True when `price` lies inside the symmetric `tolerance_pct` band around `reference`.
pub fn within_pct(price: f64, reference: f64, tolerance_pct: f64) -> bool {
    (price - reference).abs() <= reference.abs() * tolerance_pct / 100.0
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn round_cents(value: f64) -> f64 {
    round_to(value, 2)
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation; zero for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let std_dev = values.iter().population_std_dev();
    if std_dev.is_finite() {
        std_dev.max(0.0)
    } else {
        0.0
    }
}
