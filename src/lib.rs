//! Support/resistance confluence engine.
//!
//! Two pure calls: [`analyze`] turns an ascending OHLCV series into the
//! indicator bundle, and [`score_levels`] turns that bundle into ranked
//! support/resistance levels, display picks and a confidence score.

pub mod analysis;
pub mod config;
pub mod data;
pub mod loader;
pub mod output;

pub use analysis::{analyze, score_levels, AnalysisError, MarketAnalysis, ScoredAnalysis};
pub use config::EngineConfig;
pub use data::{Bar, LevelType, ScoredLevel, Timeframe};
