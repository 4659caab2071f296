use serde::Serialize;

use crate::config::IndicatorParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionStatus {
    Normal,
    Moderate,
    Overextended,
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionDirection {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversionSignal {
    None,
    PullbackWatch,
    PullbackLikely,
    BounceWatch,
    BounceLikely,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverextensionState {
    pub ema_period: usize,
    pub ema_value: f64,
    pub distance: f64,
    pub distance_percent: f64,
    pub atr_distance: f64,
    pub status: ExtensionStatus,
    pub direction: ExtensionDirection,
    pub mean_reversion: bool,
    pub signal: ReversionSignal,
}

/// How far price has stretched from the medium EMA, in ATR units.
pub fn detect_overextension(
    current_price: f64,
    ema_value: f64,
    atr: f64,
    params: &IndicatorParams,
) -> OverextensionState {
    let distance = current_price - ema_value;
    let distance_percent = if ema_value != 0.0 {
        distance / ema_value * 100.0
    } else {
        0.0
    };
    let atr_distance = if atr > 0.0 { distance / atr } else { 0.0 };

    let magnitude = atr_distance.abs();
    let status = if magnitude >= params.extreme_atr_distance {
        ExtensionStatus::Extreme
    } else if magnitude >= params.overextended_atr_distance {
        ExtensionStatus::Overextended
    } else if magnitude >= params.moderate_atr_distance {
        ExtensionStatus::Moderate
    } else {
        ExtensionStatus::Normal
    };

    let direction = if distance >= 0.0 {
        ExtensionDirection::Above
    } else {
        ExtensionDirection::Below
    };

    let signal = match (status, direction) {
        (ExtensionStatus::Normal, _) => ReversionSignal::None,
        (ExtensionStatus::Moderate, ExtensionDirection::Above) => ReversionSignal::PullbackWatch,
        (ExtensionStatus::Moderate, ExtensionDirection::Below) => ReversionSignal::BounceWatch,
        (ExtensionStatus::Overextended | ExtensionStatus::Extreme, ExtensionDirection::Above) => {
            ReversionSignal::PullbackLikely
        }
        (ExtensionStatus::Overextended | ExtensionStatus::Extreme, ExtensionDirection::Below) => {
            ReversionSignal::BounceLikely
        }
    };

    OverextensionState {
        ema_period: params.medium_ema_period,
        ema_value,
        distance,
        distance_percent,
        atr_distance,
        status,
        direction,
        mean_reversion: status != ExtensionStatus::Normal,
        signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_atr_distance() {
        let params = IndicatorParams::default();
        let normal = detect_overextension(101.0, 100.0, 1.0, &params);
        assert_eq!(normal.status, ExtensionStatus::Normal);
        assert!(!normal.mean_reversion);
        assert_eq!(normal.signal, ReversionSignal::None);

        let moderate = detect_overextension(101.5, 100.0, 1.0, &params);
        assert_eq!(moderate.status, ExtensionStatus::Moderate);
        assert_eq!(moderate.signal, ReversionSignal::PullbackWatch);

        let stretched = detect_overextension(97.0, 100.0, 1.0, &params);
        assert_eq!(stretched.status, ExtensionStatus::Overextended);
        assert_eq!(stretched.direction, ExtensionDirection::Below);
        assert_eq!(stretched.signal, ReversionSignal::BounceLikely);
        assert!((stretched.distance_percent + 3.0).abs() < 1e-12);

        let extreme = detect_overextension(104.0, 100.0, 1.0, &params);
        assert_eq!(extreme.status, ExtensionStatus::Extreme);
        assert!(extreme.mean_reversion);
    }

    #[test]
    fn zero_atr_reads_as_normal() {
        let state = detect_overextension(150.0, 100.0, 0.0, &IndicatorParams::default());
        assert_eq!(state.atr_distance, 0.0);
        assert_eq!(state.status, ExtensionStatus::Normal);
    }
}
