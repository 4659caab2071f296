use serde::Serialize;

use crate::analysis::candidates::SwingMeta;
use crate::analysis::fibonacci::FibLevel;
use crate::analysis::indicators::IndicatorSet;
use crate::analysis::stats::within_pct;
use crate::config::ScoringParams;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TouchFactor {
    pub touches: usize,
    pub points: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FibonacciFactor {
    pub label: Option<&'static str>,
    pub fib_price: Option<f64>,
    pub points: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmaFactor {
    pub period: Option<usize>,
    pub ema_value: Option<f64>,
    pub points: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeNodeFactor {
    pub node_price: Option<f64>,
    pub volume_percent: Option<f64>,
    pub points: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundNumberFactor {
    pub nearest_round: Option<f64>,
    pub divisor: Option<f64>,
    pub points: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecencyFactor {
    pub recent: bool,
    pub points: f64,
}

/// Per-factor breakdown of a level's confluence score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfluenceFactors {
    pub touches: TouchFactor,
    pub fibonacci: FibonacciFactor,
    pub ema: EmaFactor,
    pub volume_node: VolumeNodeFactor,
    pub round_number: RoundNumberFactor,
    pub recency: RecencyFactor,
}

impl ConfluenceFactors {
    pub fn total(&self) -> f64 {
        self.touches.points
            + self.fibonacci.points
            + self.ema.points
            + self.volume_node.points
            + self.round_number.points
            + self.recency.points
    }

    /// Fold in a swing that belongs to the level's group even when it sits
    /// outside the tolerance band of the group's mean price.
    pub fn credit_member_swing(&mut self, swing: &SwingMeta, params: &ScoringParams) {
        if swing.touches > self.touches.touches {
            self.touches = TouchFactor {
                touches: swing.touches,
                points: (swing.touches as f64 * params.points_per_touch)
                    .min(params.max_touch_points),
            };
        }
        if swing.recent && !self.recency.recent {
            self.recency = RecencyFactor {
                recent: true,
                points: params.recency_points,
            };
        }
    }

    /// Short phrases for the factors that fired, in factor order.
    pub fn highlights(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if self.touches.points > 0.0 {
            let plural = if self.touches.touches == 1 { "" } else { "es" };
            parts.push(format!("{} touch{plural}", self.touches.touches));
        }
        if let Some(label) = self.fibonacci.label {
            parts.push(format!("{label} Fibonacci"));
        }
        if let Some(period) = self.ema.period {
            parts.push(format!("EMA{period}"));
        }
        if self.volume_node.points > 0.0 {
            parts.push("high-volume node".to_string());
        }
        if let Some(round) = self.round_number.nearest_round {
            parts.push(format!("round number {round}"));
        }
        if self.recency.recent {
            parts.push("recent swing".to_string());
        }
        parts
    }
}

/// Score a price against the six confluence factors.
pub fn score_price(
    price: f64,
    indicators: &IndicatorSet,
    params: &ScoringParams,
) -> ConfluenceFactors {
    let tolerance = params.tolerance_pct;
    let near = |other: f64| within_pct(other, price, tolerance);
    let nearby_swings: Vec<_> = indicators
        .swings
        .iter()
        .filter(|swing| near(swing.price))
        .collect();

    let touches = nearby_swings
        .iter()
        .map(|swing| swing.touches)
        .max()
        .unwrap_or(0);
    let touch_factor = TouchFactor {
        touches,
        points: (touches as f64 * params.points_per_touch).min(params.max_touch_points),
    };

    let fibonacci = indicators
        .fibonacci
        .as_ref()
        .and_then(|fib| {
            fib.levels
                .iter()
                .filter(|level| near(level.price))
                .fold(None, |best: Option<&FibLevel>, level| match best {
                    Some(current)
                        if (current.price - price).abs() <= (level.price - price).abs() =>
                    {
                        best
                    }
                    _ => Some(level),
                })
        })
        .map(|level| FibonacciFactor {
            label: Some(level.label),
            fib_price: Some(level.price),
            points: level.weight,
        })
        .unwrap_or_default();

    let ema = indicators
        .emas
        .available()
        .filter(|&(_, value)| near(value))
        .fold(None, |best: Option<(usize, f64)>, (period, value)| match best {
            Some((_, current)) if (current - price).abs() <= (value - price).abs() => best,
            _ => Some((period, value)),
        })
        .map(|(period, value)| EmaFactor {
            period: Some(period),
            ema_value: Some(value),
            points: params.ema_points,
        })
        .unwrap_or_default();

    let volume_node = indicators
        .volume_profile
        .high_volume_nodes
        .iter()
        .find(|node| node.contains(price) || near(node.price_mid))
        .map(|node| VolumeNodeFactor {
            node_price: Some(node.price_mid),
            volume_percent: Some(node.volume_percent),
            points: params.volume_node_points,
        })
        .unwrap_or_default();

    let round_number = params
        .round_divisors
        .iter()
        .filter(|&&divisor| divisor > 0.0)
        .find_map(|&divisor| {
            let nearest = (price / divisor).round() * divisor;
            (nearest > 0.0 && near(nearest)).then_some(RoundNumberFactor {
                nearest_round: Some(nearest),
                divisor: Some(divisor),
                points: params.round_number_points,
            })
        })
        .unwrap_or_default();

    let recent = nearby_swings.iter().any(|swing| swing.recent);
    let recency = RecencyFactor {
        recent,
        points: if recent { params.recency_points } else { 0.0 },
    };

    ConfluenceFactors {
        touches: touch_factor,
        fibonacci,
        ema,
        volume_node,
        round_number,
        recency,
    }
}
