// End-to-end tests for the two-call engine contract:
//   bars -> analyze (indicator bundle) -> score_levels (levels + confidence)
//
// Run with: cargo test --test pipeline_test

use chrono::{Duration, TimeZone};
use chrono_tz::UTC;

use level_confluence::analysis::stats::pct_distance;
use level_confluence::analysis::{score_price, ConfidenceLabel, SwingDirection, TrendDirection};
use level_confluence::output::render_json;
use level_confluence::{
    analyze, score_levels, AnalysisError, Bar, EngineConfig, LevelType, Timeframe,
};

// ============================================================================
// Helpers
// ============================================================================

fn make_bar(index: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    let start = UTC.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    Bar::new(start + Duration::days(index as i64), open, high, low, close, volume)
}

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close, close + 0.5, close - 0.5, close, 10_000.0))
        .collect()
}

/// Deterministic pseudo-random walk so tests never depend on a RNG crate.
fn random_walk(seed: u64, len: usize, start: f64) -> Vec<Bar> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as f64) / ((1u64 << 31) as f64)
    };
    let mut close = start;
    (0..len)
        .map(|i| {
            let open = close;
            close = (close * (1.0 + (next() - 0.5) * 0.04)).max(1.0);
            let high = open.max(close) * (1.0 + next() * 0.01);
            let low = open.min(close) * (1.0 - next() * 0.01);
            let volume = 1_000.0 + next() * 50_000.0;
            make_bar(i, open, high, low, close, volume)
        })
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_rising_series_uses_available_emas() {
    let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
    let bars = bars_from_closes(&closes);
    let config = EngineConfig::default();
    let market = analyze(&bars, "RISE", Timeframe::Daily, &config).unwrap();
    let ind = &market.indicators;

    assert!(ind.emas.get(9).is_some());
    assert!(ind.emas.get(21).is_some());
    assert!(ind.emas.get(65).is_none());
    assert!(ind.emas.get(100).is_none());
    assert!(ind.emas.get(200).is_none());
    assert_eq!(ind.trend.total_emas, 2);
    assert_eq!(ind.trend.direction, TrendDirection::StrongUptrend);

    assert!(ind.atr.atr > 0.0);

    let fib = ind.fibonacci.as_ref().expect("daily series with 25 bars has fibonacci");
    assert_eq!(fib.direction, SwingDirection::Up);
    assert_eq!(fib.swing_high_date, bars[24].date);
    assert_eq!(fib.swing_low_date, bars[0].date);
    assert!((0.0..=1.0).contains(&fib.current_retracement));

    let scored = score_levels(&market, &config);
    let json = render_json(&market, &scored).unwrap();
    assert!(json.contains("\"strong_uptrend\""));
    assert!(json.contains("\"confidence\""));
}

#[test]
fn scenario_b_flat_series_is_guarded() {
    let bars = bars_from_closes(&[100.0; 60]);
    let config = EngineConfig::default();
    let market = analyze(&bars, "FLAT", Timeframe::Daily, &config).unwrap();
    let bands = &market.indicators.bollinger;

    assert_eq!(bands.std_dev, 0.0);
    assert_eq!(bands.bandwidth, 0.0);
    assert_eq!(bands.percent_b, 0.5);
    assert!(bands.squeeze);
    assert!(bands.lower <= bands.middle && bands.middle <= bands.upper);

    let scored = score_levels(&market, &config);
    assert!(scored.confidence.score.is_finite());
    assert!(scored
        .confidence
        .adjustments
        .iter()
        .any(|adj| adj.name == "bollinger_squeeze"));
}

#[test]
fn scenario_c_round_hundred_beats_smaller_divisors() {
    let closes: Vec<f64> = (0..40).map(|i| 195.0 + (i % 5) as f64 * 2.0).collect();
    let market = analyze(
        &bars_from_closes(&closes),
        "ROUND",
        Timeframe::Daily,
        &EngineConfig::default(),
    )
    .unwrap();
    let factors = score_price(200.0, &market.indicators, &EngineConfig::default().scoring);
    assert_eq!(factors.round_number.nearest_round, Some(200.0));
    assert_eq!(factors.round_number.divisor, Some(100.0));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn too_few_bars_reports_insufficient_data() {
    let bars = bars_from_closes(&[50.0; 19]);
    let err = analyze(&bars, "SHORT", Timeframe::Daily, &EngineConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InsufficientData {
            available: 19,
            ..
        }
    ));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let bars = random_walk(7, 300, 150.0);
    let config = EngineConfig::default();
    let render = || {
        let market = analyze(&bars, "WALK", Timeframe::Daily, &config).unwrap();
        let scored = score_levels(&market, &config);
        render_json(&market, &scored).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn invariants_hold_across_random_series() {
    let config = EngineConfig::default();
    for seed in 1..25u64 {
        for timeframe in [Timeframe::Intraday, Timeframe::Daily, Timeframe::Weekly] {
            let bars = random_walk(seed, 40 + (seed as usize * 13) % 260, 20.0 + seed as f64 * 9.0);
            let market = analyze(&bars, "RAND", timeframe, &config).unwrap();
            let ind = &market.indicators;

            assert!(ind.atr.atr >= 0.0 && ind.atr.atr_percent >= 0.0);
            assert!(ind.bollinger.lower <= ind.bollinger.middle);
            assert!(ind.bollinger.middle <= ind.bollinger.upper);
            if let Some(fib) = &ind.fibonacci {
                assert!((0.0..=1.0).contains(&fib.current_retracement));
            }
            assert_eq!(ind.fibonacci.is_some(), timeframe != Timeframe::Intraday);
            assert!(ind.swings.iter().all(|swing| swing.index < bars.len()));

            let scored = score_levels(&market, &config);
            let confidence = &scored.confidence;
            assert!((30.0..=100.0).contains(&confidence.score));
            assert_eq!(confidence.label, ConfidenceLabel::from_score(confidence.score));

            for (side, expected) in [
                (&scored.support, LevelType::Support),
                (&scored.resistance, LevelType::Resistance),
            ] {
                assert!(side.iter().all(|level| level.level_type == expected));
                assert!(side.windows(2).all(|pair| pair[0].score >= pair[1].score));
            }

            for picks in [
                &scored.display_support,
                &scored.display_resistance,
                &scored.expanded_support,
                &scored.expanded_resistance,
            ] {
                assert!(picks.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
                for (i, a) in picks.iter().enumerate() {
                    for b in &picks[i + 1..] {
                        assert!(pct_distance(a.price, b.price) >= config.display.min_spacing_pct);
                    }
                }
            }
            assert!(scored.display_support.len() <= config.display.default_count);
            assert!(scored.expanded_resistance.len() <= config.display.expanded_count);
        }
    }
}
