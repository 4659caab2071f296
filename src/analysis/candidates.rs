use serde::Serialize;

use crate::analysis::indicators::IndicatorSet;
use crate::data::{LevelType, SwingType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    Swing,
    Fibonacci,
    Ema,
    VolumeNode,
}

impl LevelSource {
    pub fn as_str(self) -> &'static str {
        match self {
            LevelSource::Swing => "swing",
            LevelSource::Fibonacci => "fibonacci",
            LevelSource::Ema => "ema",
            LevelSource::VolumeNode => "volume_node",
        }
    }
}

/// Touch and recency data carried by swing candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwingMeta {
    pub swing_type: SwingType,
    pub touches: usize,
    pub recent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateLevel {
    pub price: f64,
    pub level_type: LevelType,
    pub source: LevelSource,
    pub swing: Option<SwingMeta>,
}

/// Pool raw prices from swings, Fibonacci levels, EMAs and volume nodes.
pub fn generate_candidates(indicators: &IndicatorSet, current_price: f64) -> Vec<CandidateLevel> {
    let mut candidates = Vec::new();

    for swing in &indicators.swings {
        candidates.push(CandidateLevel {
            price: swing.price,
            level_type: match swing.swing_type {
                SwingType::High => LevelType::Resistance,
                SwingType::Low => LevelType::Support,
            },
            source: LevelSource::Swing,
            swing: Some(SwingMeta {
                swing_type: swing.swing_type,
                touches: swing.touches,
                recent: swing.recent,
            }),
        });
    }

    let derived = indicators
        .fibonacci
        .iter()
        .flat_map(|fib| fib.levels.iter().map(|level| (level.price, LevelSource::Fibonacci)))
        .chain(indicators.emas.available().map(|(_, value)| (value, LevelSource::Ema)))
        .chain(
            indicators
                .volume_profile
                .high_volume_nodes
                .iter()
                .map(|node| (node.price_mid, LevelSource::VolumeNode)),
        );
    for (price, source) in derived {
        candidates.push(CandidateLevel {
            price,
            level_type: LevelType::from_price(price, current_price),
            source,
            swing: None,
        });
    }

    candidates
}
