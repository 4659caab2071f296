use serde::Serialize;

use crate::analysis::bollinger::BollingerState;
use crate::analysis::overextension::{ExtensionStatus, OverextensionState};
use crate::analysis::trend::{TradingBias, TrendDirection, TrendState};
use crate::config::ConfidenceParams;
use crate::data::{LevelStrength, ScoredLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl ConfidenceLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ConfidenceLabel::High
        } else if score >= 60.0 {
            ConfidenceLabel::Moderate
        } else if score >= 40.0 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::VeryLow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLabel::High => "high",
            ConfidenceLabel::Moderate => "moderate",
            ConfidenceLabel::Low => "low",
            ConfidenceLabel::VeryLow => "very low",
        }
    }
}

/// One bonus or penalty applied to the confidence score.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceAdjustment {
    pub name: &'static str,
    pub impact: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceScoring {
    pub score: f64,
    pub label: ConfidenceLabel,
    pub adjustments: Vec<ConfidenceAdjustment>,
}

pub struct ConfidenceInputs<'a> {
    pub trend: &'a TrendState,
    pub support: &'a [ScoredLevel],
    pub resistance: &'a [ScoredLevel],
    pub bollinger: &'a BollingerState,
    pub overextension: &'a OverextensionState,
    pub bar_count: usize,
}

fn has_strong(levels: &[ScoredLevel]) -> bool {
    levels
        .iter()
        .any(|level| level.strength == LevelStrength::Strong)
}

fn strong_within<'a>(levels: &'a [ScoredLevel], max_pct: f64) -> Option<&'a ScoredLevel> {
    levels
        .iter()
        .filter(|level| {
            level.strength == LevelStrength::Strong && level.distance_percent <= max_pct
        })
        .min_by(|a, b| {
            a.distance_percent
                .partial_cmp(&b.distance_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Fold trend, level and volatility context into a single 0-100 score with
/// an audit trail of every adjustment applied.
pub fn aggregate_confidence(
    inputs: &ConfidenceInputs<'_>,
    params: &ConfidenceParams,
) -> ConfidenceScoring {
    let mut adjustments = Vec::new();

    if inputs.trend.direction != TrendDirection::Ranging {
        adjustments.push(ConfidenceAdjustment {
            name: "trend",
            impact: params.trend_bonus,
            reason: format!("Clear {} in place", inputs.trend.direction.as_str()),
        });
    }

    if has_strong(inputs.support) && has_strong(inputs.resistance) {
        adjustments.push(ConfidenceAdjustment {
            name: "two_sided_levels",
            impact: params.two_sided_bonus,
            reason: "Strong support and strong resistance both identified".to_string(),
        });
    }

    if inputs.overextension.status == ExtensionStatus::Normal {
        adjustments.push(ConfidenceAdjustment {
            name: "normal_extension",
            impact: params.normal_extension_bonus,
            reason: format!(
                "Price within normal range of EMA{}",
                inputs.overextension.ema_period
            ),
        });
    }

    if inputs.bollinger.squeeze {
        adjustments.push(ConfidenceAdjustment {
            name: "bollinger_squeeze",
            impact: -params.squeeze_penalty,
            reason: "Bollinger squeeze: breakout direction uncertain".to_string(),
        });
    }

    let conflict = match inputs.trend.bias {
        TradingBias::Long => strong_within(inputs.resistance, params.conflict_distance_pct).map(
            |level| {
                format!(
                    "Long bias but strong resistance {} is {:.2}% away",
                    level.id, level.distance_percent
                )
            },
        ),
        TradingBias::Short => strong_within(inputs.support, params.conflict_distance_pct).map(
            |level| {
                format!(
                    "Short bias but strong support {} is {:.2}% away",
                    level.id, level.distance_percent
                )
            },
        ),
        TradingBias::Neutral => None,
    };
    if let Some(reason) = conflict {
        adjustments.push(ConfidenceAdjustment {
            name: "bias_conflict",
            impact: -params.conflict_penalty,
            reason,
        });
    }

    if inputs.bar_count < params.min_bars_for_confidence {
        adjustments.push(ConfidenceAdjustment {
            name: "limited_history",
            impact: -params.data_penalty,
            reason: format!(
                "Only {} bars available (fewer than {})",
                inputs.bar_count, params.min_bars_for_confidence
            ),
        });
    }

    let raw = params.base_score + adjustments.iter().map(|adj| adj.impact).sum::<f64>();
    let score = raw.clamp(params.floor, params.ceiling);

    ConfidenceScoring {
        score,
        label: ConfidenceLabel::from_score(score),
        adjustments,
    }
}
