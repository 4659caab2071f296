use chrono::{Duration, TimeZone};
use chrono_tz::UTC;

use crate::data::Bar;

pub fn bar_with_volume(index: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    let start = UTC
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid start date");
    Bar::new(
        start + Duration::days(index as i64),
        open,
        high,
        low,
        close,
        volume,
    )
}

pub fn bar(index: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    bar_with_volume(index, open, high, low, close, 1_000.0)
}

/// Daily bars with a half-point wick either side of each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(idx, &close)| bar(idx, close, close + 0.5, close - 0.5, close))
        .collect()
}
