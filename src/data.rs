use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::candidates::LevelSource;
use crate::analysis::confluence::ConfluenceFactors;

/// Single OHLCV bar sampled at a uniform interval.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Tz>,
    /// Calendar date label (`YYYY-MM-DD`) in the bar's own zone.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Tz>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date: timestamp.format("%Y-%m-%d").to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingType {
    High,
    Low,
}

/// Confirmed local extreme together with how often price came back to it.
#[derive(Debug, Clone, Serialize)]
pub struct SwingPoint {
    pub index: usize,
    pub date: String,
    pub price: f64,
    pub swing_type: SwingType,
    pub touches: usize,
    pub last_touch_date: Option<String>,
    pub recent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelType {
    Support,
    Resistance,
}

impl LevelType {
    /// Support below the current price, resistance at or above it.
    pub fn from_price(price: f64, current_price: f64) -> Self {
        if price < current_price {
            LevelType::Support
        } else {
            LevelType::Resistance
        }
    }

    pub fn id_prefix(self) -> char {
        match self {
            LevelType::Support => 'S',
            LevelType::Resistance => 'R',
        }
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelType::Support => f.write_str("Support"),
            LevelType::Resistance => f.write_str("Resistance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStrength {
    Strong,
    Medium,
    Weak,
}

impl LevelStrength {
    pub fn as_str(self) -> &'static str {
        match self {
            LevelStrength::Strong => "strong",
            LevelStrength::Medium => "medium",
            LevelStrength::Weak => "weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Zone {
    pub low: f64,
    pub high: f64,
}

/// Consolidated, scored support or resistance level.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredLevel {
    pub id: String,
    pub price: f64,
    pub level_type: LevelType,
    pub score: f64,
    pub strength: LevelStrength,
    pub factors: ConfluenceFactors,
    pub description: String,
    pub zone: Zone,
    pub distance: f64,
    pub distance_percent: f64,
    pub member_count: usize,
    /// Candidate generators that fed this level.
    pub sources: Vec<LevelSource>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised timeframe '{0}' (expected e.g. 5m, 1h, 1d, 1w)")]
pub struct TimeframeError(pub String);

/// Bar interval class. Drives the swing window and Fibonacci gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Intraday,
    Daily,
    Weekly,
}

impl Timeframe {
    /// Bars required on each side of a swing candidate.
    pub fn swing_window(self) -> usize {
        match self {
            Timeframe::Intraday => 3,
            Timeframe::Daily => 5,
            Timeframe::Weekly => 8,
        }
    }

    pub fn supports_fibonacci(self) -> bool {
        matches!(self, Timeframe::Daily | Timeframe::Weekly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Intraday => "intraday",
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
        }
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "1d" | "d" | "day" | "daily" => Ok(Timeframe::Daily),
            "1w" | "w" | "week" | "weekly" => Ok(Timeframe::Weekly),
            "intraday" | "1m" | "5m" | "15m" | "30m" | "1h" | "2h" | "4h" | "60m" => {
                Ok(Timeframe::Intraday)
            }
            _ => Err(TimeframeError(value.to_string())),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Utility describing the regular trading hours window in exchange-local time.
#[derive(Debug, Clone, Copy)]
pub struct RthWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for RthWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl RthWindow {
    pub fn contains(&self, timestamp: &DateTime<Tz>) -> bool {
        let time = timestamp.time();
        time >= self.start && time < self.end
    }
}
