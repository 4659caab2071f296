use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::data::Bar;

#[derive(Debug, Clone, Serialize)]
pub struct VolumeBucket {
    pub price_low: f64,
    pub price_high: f64,
    pub price_mid: f64,
    pub volume: f64,
    pub volume_percent: f64,
}

impl VolumeBucket {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.price_low && price <= self.price_high
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeProfile {
    pub buckets: Vec<VolumeBucket>,
    pub high_volume_nodes: Vec<VolumeBucket>,
    pub point_of_control: Option<VolumeBucket>,
    pub total_volume: f64,
}

/// Close-based volume-at-price histogram over the full bar range.
pub fn compute_volume_profile(
    bars: &[Bar],
    bucket_count: usize,
    node_multiple: f64,
    max_nodes: usize,
) -> VolumeProfile {
    let empty = VolumeProfile {
        buckets: Vec::new(),
        high_volume_nodes: Vec::new(),
        point_of_control: None,
        total_volume: 0.0,
    };
    if bars.is_empty() || bucket_count == 0 {
        return empty;
    }

    let (price_min, price_max) = match bars.iter().flat_map(|bar| [bar.low, bar.high]).minmax() {
        MinMaxResult::NoElements => return empty,
        MinMaxResult::OneElement(price) => (price, price),
        MinMaxResult::MinMax(low, high) => (low, high),
    };
    let range = (price_max - price_min).max(0.0);
    let bucket_size = range / bucket_count as f64;

    let mut volumes = vec![0.0_f64; bucket_count];
    for bar in bars {
        let idx = if bucket_size > 0.0 {
            (((bar.close - price_min) / bucket_size).floor().max(0.0) as usize).min(bucket_count - 1)
        } else {
            0
        };
        volumes[idx] += bar.volume.max(0.0);
    }

    let total_volume: f64 = volumes.iter().sum();
    let buckets: Vec<VolumeBucket> = volumes
        .iter()
        .enumerate()
        .map(|(idx, &volume)| {
            let price_low = price_min + bucket_size * idx as f64;
            let price_high = price_low + bucket_size;
            VolumeBucket {
                price_low,
                price_high,
                price_mid: (price_low + price_high) / 2.0,
                volume,
                volume_percent: if total_volume > 0.0 {
                    volume / total_volume * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let average = total_volume / bucket_count as f64;
    let high_volume_nodes: Vec<VolumeBucket> = buckets
        .iter()
        .filter(|bucket| total_volume > 0.0 && bucket.volume > average * node_multiple)
        .cloned()
        .sorted_by(|a, b| {
            b.volume_percent
                .partial_cmp(&a.volume_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .take(max_nodes)
        .collect();

    let point_of_control = buckets
        .iter()
        .fold(None::<&VolumeBucket>, |best, bucket| match best {
            Some(current) if current.volume >= bucket.volume => Some(current),
            _ => Some(bucket),
        })
        .filter(|_| total_volume > 0.0)
        .cloned();

    VolumeProfile {
        buckets,
        high_volume_nodes,
        point_of_control,
        total_volume,
    }
}
