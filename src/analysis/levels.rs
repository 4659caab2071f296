use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::atr::AtrState;
use crate::analysis::candidates::{generate_candidates, CandidateLevel};
use crate::analysis::clustering::group_candidates;
use crate::analysis::confidence::{aggregate_confidence, ConfidenceInputs, ConfidenceScoring};
use crate::analysis::confluence::{score_price, ConfluenceFactors};
use crate::analysis::display::select_display_levels;
use crate::analysis::indicators::{IndicatorSet, MarketAnalysis};
use crate::analysis::stats::{pct_distance, round_cents, round_to, within_pct};
use crate::config::{EngineConfig, ScoringParams};
use crate::data::{LevelStrength, LevelType, ScoredLevel, Zone};

/// Consolidated levels per side, ranked by score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsolidatedLevels {
    pub support: Vec<ScoredLevel>,
    pub resistance: Vec<ScoredLevel>,
}

/// Second-stage output: scored levels, display picks and confidence.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAnalysis {
    pub support: Vec<ScoredLevel>,
    pub resistance: Vec<ScoredLevel>,
    pub display_support: Vec<ScoredLevel>,
    pub display_resistance: Vec<ScoredLevel>,
    pub expanded_support: Vec<ScoredLevel>,
    pub expanded_resistance: Vec<ScoredLevel>,
    pub confidence: ConfidenceScoring,
}

fn classify_strength(score: f64, atr: &AtrState, params: &ScoringParams) -> Option<LevelStrength> {
    let adjustment = atr.threshold_adjustment;
    if score >= params.strong_threshold + adjustment {
        Some(LevelStrength::Strong)
    } else if score >= params.medium_threshold + adjustment {
        Some(LevelStrength::Medium)
    } else if score >= params.weak_threshold + adjustment {
        Some(LevelStrength::Weak)
    } else {
        None
    }
}

fn describe(
    level_type: LevelType,
    strength: LevelStrength,
    price: f64,
    factors: &ConfluenceFactors,
) -> String {
    let highlights = factors.highlights();
    let detail = if highlights.is_empty() {
        "no confluence".to_string()
    } else {
        highlights.iter().join(", ")
    };
    format!(
        "{} {} at {:.2}: {}",
        capitalize(strength.as_str()),
        level_type.to_string().to_lowercase(),
        price,
        detail
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn rank_by_score(levels: &mut [ScoredLevel]) {
    levels.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Group nearby candidates, score each group and keep the actionable ones.
///
/// IDs are handed out per side in group order, before ranking by score.
pub fn consolidate_levels(
    candidates: &[CandidateLevel],
    indicators: &IndicatorSet,
    current_price: f64,
    config: &EngineConfig,
) -> ConsolidatedLevels {
    let params = &config.scoring;
    let atr = &indicators.atr;
    let half_width = atr.atr * atr.multiplier * params.zone_width_factor;

    let mut result = ConsolidatedLevels::default();
    let groups = group_candidates(candidates, params.tolerance_pct);
    for group in &groups {
        let price = group.representative_price();
        if within_pct(price, current_price, params.min_distance_pct) {
            continue;
        }
        let mut factors = score_price(price, indicators, params);
        for swing in &group.swings {
            factors.credit_member_swing(swing, params);
        }
        let score = factors.total();
        let Some(strength) = classify_strength(score, atr, params) else {
            continue;
        };

        let level_type = LevelType::from_price(price, current_price);
        let side = match level_type {
            LevelType::Support => &mut result.support,
            LevelType::Resistance => &mut result.resistance,
        };
        let id = format!("{}{}", level_type.id_prefix(), side.len() + 1);
        let rounded = round_cents(price);
        side.push(ScoredLevel {
            id,
            price: rounded,
            level_type,
            score,
            strength,
            description: describe(level_type, strength, rounded, &factors),
            factors,
            zone: Zone {
                low: round_cents(price - half_width),
                high: round_cents(price + half_width),
            },
            distance: round_cents((price - current_price).abs()),
            distance_percent: round_to(pct_distance(price, current_price), 2),
            member_count: group.len(),
            sources: group.distinct_sources(),
        });
    }

    debug!(
        groups = groups.len(),
        support = result.support.len(),
        resistance = result.resistance.len(),
        "levels consolidated"
    );

    rank_by_score(&mut result.support);
    rank_by_score(&mut result.resistance);
    result
}

/// Score levels and aggregate confidence for a finished market analysis.
pub fn score_levels(analysis: &MarketAnalysis, config: &EngineConfig) -> ScoredAnalysis {
    let indicators = &analysis.indicators;
    let candidates = generate_candidates(indicators, analysis.current_price);
    let ConsolidatedLevels {
        support,
        resistance,
    } = consolidate_levels(&candidates, indicators, analysis.current_price, config);

    let display = &config.display;
    let spacing = display.min_spacing_pct;
    let display_support = select_display_levels(&support, display.default_count, spacing);
    let display_resistance = select_display_levels(&resistance, display.default_count, spacing);
    let expanded_support = select_display_levels(&support, display.expanded_count, spacing);
    let expanded_resistance = select_display_levels(&resistance, display.expanded_count, spacing);

    let confidence = aggregate_confidence(
        &ConfidenceInputs {
            trend: &indicators.trend,
            support: &support,
            resistance: &resistance,
            bollinger: &indicators.bollinger,
            overextension: &indicators.overextension,
            bar_count: analysis.bar_count,
        },
        &config.confidence,
    );

    info!(
        symbol = %analysis.symbol,
        candidates = candidates.len(),
        support = support.len(),
        resistance = resistance.len(),
        confidence = confidence.score,
        "level scoring complete"
    );

    ScoredAnalysis {
        support,
        resistance,
        display_support,
        display_resistance,
        expanded_support,
        expanded_resistance,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::atr::VolatilityRegime;
    use crate::analysis::candidates::LevelSource;
    use crate::analysis::indicators::analyze;
    use crate::analysis::test_support::bars_from_closes;
    use crate::data::Timeframe;

    fn sample_analysis() -> MarketAnalysis {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + ((i as f64) * 0.35).sin() * 10.0 + i as f64 * 0.05)
            .collect();
        analyze(
            &bars_from_closes(&closes),
            "TEST",
            Timeframe::Daily,
            &EngineConfig::default(),
        )
        .unwrap()
    }

    fn candidate(price: f64, current: f64) -> CandidateLevel {
        CandidateLevel {
            price,
            level_type: LevelType::from_price(price, current),
            source: LevelSource::Ema,
            swing: None,
        }
    }

    #[test]
    fn high_volatility_raises_thresholds() {
        let params = ScoringParams::default();
        let mut atr = AtrState {
            atr: 1.0,
            atr_percent: 1.0,
            regime: VolatilityRegime::Low,
            multiplier: 1.0,
            threshold_adjustment: 0.0,
        };
        assert_eq!(classify_strength(7.0, &atr, &params), Some(LevelStrength::Strong));
        atr.threshold_adjustment = 1.0;
        assert_eq!(classify_strength(7.0, &atr, &params), Some(LevelStrength::Medium));
        assert_eq!(classify_strength(3.0, &atr, &params), None);
    }

    #[test]
    fn levels_near_price_are_dropped_and_zones_follow_atr() {
        let analysis = sample_analysis();
        let current = analysis.current_price;
        let config = EngineConfig::default();
        let candidates = vec![
            candidate(current * 1.002, current),
            candidate(200.0, current),
            candidate(50.0, current),
        ];
        let mut indicators = analysis.indicators.clone();
        indicators.swings.clear();
        indicators.fibonacci = None;
        indicators.volume_profile.high_volume_nodes.clear();
        indicators.atr.threshold_adjustment = 0.0;
        let levels = consolidate_levels(&candidates, &indicators, current, &config);

        // Only round-number confluence remains: 1 point is below the weak floor.
        assert!(levels.support.is_empty());
        assert!(levels.resistance.is_empty());

        let mut generous = config.clone();
        generous.scoring.weak_threshold = 1.0;
        let levels = consolidate_levels(&candidates, &indicators, current, &generous);
        assert_eq!(levels.resistance.len(), 1);
        assert_eq!(levels.support.len(), 1);
        let level = &levels.resistance[0];
        assert_eq!(level.id, "R1");
        assert_eq!(level.price, 200.0);
        assert_eq!(level.sources, vec![LevelSource::Ema]);
        let half = indicators.atr.atr * indicators.atr.multiplier * 0.5;
        assert!((level.zone.high - level.price - half).abs() < 0.011);
        assert!((level.price - level.zone.low - half).abs() < 0.011);
        assert_eq!(levels.support[0].id, "S1");
    }

    #[test]
    fn member_swings_count_even_when_the_mean_drifts_away() {
        use crate::analysis::candidates::SwingMeta;
        use crate::data::SwingType;

        let analysis = sample_analysis();
        let mut indicators = analysis.indicators.clone();
        indicators.swings.clear();
        indicators.fibonacci = None;
        indicators.volume_profile.high_volume_nodes.clear();
        indicators.atr.threshold_adjustment = 0.0;

        let swing = CandidateLevel {
            price: 110.0,
            level_type: LevelType::Resistance,
            source: LevelSource::Swing,
            swing: Some(SwingMeta {
                swing_type: SwingType::High,
                touches: 3,
                recent: true,
            }),
        };
        let candidates = vec![swing, candidate(110.5, 100.0)];
        let levels = consolidate_levels(&candidates, &indicators, 100.0, &EngineConfig::default());

        assert_eq!(levels.resistance.len(), 1);
        let level = &levels.resistance[0];
        assert_eq!(level.price, 110.25);
        assert_eq!(level.member_count, 2);
        assert_eq!(level.factors.touches.touches, 3);
        assert_eq!(level.factors.touches.points, 3.0);
        assert!(level.factors.recency.recent);
        assert_eq!(level.sources, vec![LevelSource::Swing, LevelSource::Ema]);
        assert!(level.score >= 4.5);
    }

    #[test]
    fn ids_follow_group_order_not_score() {
        let analysis = sample_analysis();
        let current = analysis.current_price;
        let config = EngineConfig::default();
        let candidates = generate_candidates(&analysis.indicators, current);
        let levels = consolidate_levels(&candidates, &analysis.indicators, current, &config);
        for side in [&levels.support, &levels.resistance] {
            assert!(side.windows(2).all(|pair| pair[0].score >= pair[1].score));
            let mut numbers: Vec<usize> = side
                .iter()
                .map(|level| level.id[1..].parse().unwrap())
                .collect();
            numbers.sort_unstable();
            assert_eq!(numbers, (1..=side.len()).collect::<Vec<_>>());
        }
        for level in levels.support.iter().chain(levels.resistance.iter()) {
            assert!(level.distance_percent >= 0.5);
            assert!(level.score >= config.scoring.weak_threshold);
            assert!(level.zone.low <= level.price && level.price <= level.zone.high);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let analysis = sample_analysis();
        let config = EngineConfig::default();
        let first = serde_json::to_string(&score_levels(&analysis, &config)).unwrap();
        let second = serde_json::to_string(&score_levels(&analysis, &config)).unwrap();
        assert_eq!(first, second);
    }
}
