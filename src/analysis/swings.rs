use crate::analysis::stats::within_pct;
use crate::data::{Bar, SwingPoint, SwingType};

/// Detect swing highs and lows confirmed by `window` bars on each side.
///
/// A swing high must strictly exceed the high of every neighbour in the
/// window (lows symmetric). Bars without a full window on both sides are
/// never swings. Each swing's touch count comes from a second pass over
/// the whole series; the result lists recent swings first, then by touch
/// count, keeping bar order among equals.
pub fn detect_swings(
    bars: &[Bar],
    window: usize,
    touch_tolerance_pct: f64,
    recent_fraction: f64,
) -> Vec<SwingPoint> {
    if window == 0 || bars.len() < 2 * window + 1 {
        return Vec::new();
    }

    let recent_start = (bars.len() as f64 * (1.0 - recent_fraction)).floor() as usize;
    let mut swings = Vec::new();
    for idx in window..bars.len() - window {
        let neighbours = || {
            bars[idx - window..idx]
                .iter()
                .chain(bars[idx + 1..=idx + window].iter())
        };
        let bar = &bars[idx];
        if neighbours().all(|other| bar.high > other.high) {
            swings.push(new_swing(bar, idx, bar.high, SwingType::High, recent_start));
        }
        if neighbours().all(|other| bar.low < other.low) {
            swings.push(new_swing(bar, idx, bar.low, SwingType::Low, recent_start));
        }
    }

    for swing in &mut swings {
        let (touches, last_touch_date) = count_touches(bars, swing.price, touch_tolerance_pct);
        swing.touches = touches;
        swing.last_touch_date = last_touch_date;
    }

    swings.sort_by(|a, b| b.recent.cmp(&a.recent).then(b.touches.cmp(&a.touches)));
    swings
}

fn new_swing(
    bar: &Bar,
    index: usize,
    price: f64,
    swing_type: SwingType,
    recent_start: usize,
) -> SwingPoint {
    SwingPoint {
        index,
        date: bar.date.clone(),
        price,
        swing_type,
        touches: 0,
        last_touch_date: None,
        recent: index >= recent_start,
    }
}

/// Bars whose high or low came within tolerance of `price`, with the date
/// of the latest one.
pub fn count_touches(bars: &[Bar], price: f64, tolerance_pct: f64) -> (usize, Option<String>) {
    let mut touches = 0usize;
    let mut last_touch = None;
    for bar in bars {
        if within_pct(bar.high, price, tolerance_pct) || within_pct(bar.low, price, tolerance_pct) {
            touches += 1;
            last_touch = Some(bar.date.clone());
        }
    }
    (touches, last_touch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{bar, bars_from_closes};

    fn peak_series() -> Vec<Bar> {
        let closes = [
            100.0, 101.0, 102.0, 103.0, 104.0, 110.0, 104.0, 103.0, 102.0, 101.0, 100.0, 95.0,
            100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0,
        ];
        bars_from_closes(&closes)
    }

    #[test]
    fn detects_peak_and_trough_with_strict_window() {
        let swings = detect_swings(&peak_series(), 5, 0.5, 0.2);
        let high = swings
            .iter()
            .find(|s| s.swing_type == SwingType::High)
            .unwrap();
        assert_eq!(high.index, 5);
        let low = swings
            .iter()
            .find(|s| s.swing_type == SwingType::Low)
            .unwrap();
        assert_eq!(low.index, 11);
        assert_eq!(swings.len(), 2);
    }

    #[test]
    fn equal_neighbour_blocks_swing() {
        let mut bars = peak_series();
        bars[4] = bar(4, 104.0, bars[5].high, 103.0, 104.0);
        let swings = detect_swings(&bars, 5, 0.5, 0.2);
        assert!(swings.iter().all(|s| s.swing_type != SwingType::High));
    }

    #[test]
    fn edges_without_full_window_are_skipped() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let swings = detect_swings(&bars_from_closes(&closes), 5, 0.5, 0.2);
        assert!(swings.is_empty());
    }

    #[test]
    fn no_bar_is_both_high_and_low() {
        let swings = detect_swings(&peak_series(), 3, 0.5, 0.2);
        for a in &swings {
            assert!(!swings
                .iter()
                .any(|b| b.index == a.index && b.swing_type != a.swing_type));
        }
    }

    #[test]
    fn touches_include_revisits_and_track_latest_date() {
        let mut closes = vec![100.0; 6];
        closes.extend([120.0, 100.0, 100.0, 100.0, 100.0, 100.0, 119.9, 100.0, 100.0]);
        let bars = bars_from_closes(&closes);
        let (touches, last) = count_touches(&bars, bars[6].high, 0.5);
        assert_eq!(touches, 2);
        assert_eq!(last.as_deref(), Some(bars[12].date.as_str()));
    }

    #[test]
    fn recent_swings_sort_first() {
        let mut closes: Vec<f64> = Vec::new();
        for cycle in 0..5 {
            let base = 100.0 + cycle as f64;
            closes.extend([base, base + 1.0, base + 5.0, base + 1.0, base]);
        }
        let bars = bars_from_closes(&closes);
        let swings = detect_swings(&bars, 2, 0.1, 0.2);
        assert!(swings.first().map_or(false, |s| s.recent));
        let first_old = swings.iter().position(|s| !s.recent).unwrap();
        assert!(swings[first_old..].iter().all(|s| !s.recent));
    }
}
