pub mod atr;
pub mod bollinger;
pub mod candidates;
pub mod clustering;
pub mod confidence;
pub mod confluence;
pub mod display;
pub mod ema;
pub mod fibonacci;
pub mod indicators;
pub mod levels;
pub mod overextension;
pub mod stats;
pub mod swings;
pub mod trend;
pub mod volume_profile;

#[cfg(test)]
pub(crate) mod test_support;

pub use atr::{atr_state, compute_atr, AtrState, VolatilityRegime};
pub use bollinger::{compute_bollinger, BandPosition, BollingerState};
pub use candidates::{generate_candidates, CandidateLevel, LevelSource};
pub use clustering::{group_candidates, LevelGroup};
pub use confidence::{aggregate_confidence, ConfidenceLabel, ConfidenceScoring};
pub use confluence::{score_price, ConfluenceFactors};
pub use display::select_display_levels;
pub use ema::{compute_ema, EmaSnapshot};
pub use fibonacci::{compute_fibonacci, FibonacciState, SwingDirection};
pub use indicators::{analyze, AnalysisError, IndicatorSet, MarketAnalysis};
pub use levels::{consolidate_levels, score_levels, ScoredAnalysis};
pub use overextension::{detect_overextension, ExtensionStatus, OverextensionState};
pub use swings::detect_swings;
pub use trend::{classify_trend, TradingBias, TrendDirection, TrendState};
pub use volume_profile::{compute_volume_profile, VolumeProfile};
