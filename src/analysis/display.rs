use crate::analysis::stats::pct_distance;
use crate::data::ScoredLevel;

/// Pick up to `max_levels` from a strength-ranked list, skipping any level
/// within `min_spacing_pct` of one already taken, then order the picks by
/// distance from price.
pub fn select_display_levels(
    ranked: &[ScoredLevel],
    max_levels: usize,
    min_spacing_pct: f64,
) -> Vec<ScoredLevel> {
    let mut selected: Vec<ScoredLevel> = Vec::with_capacity(max_levels);
    for level in ranked {
        if selected.len() >= max_levels {
            break;
        }
        let crowded = selected.iter().any(|taken| {
            pct_distance(level.price, taken.price) < min_spacing_pct
                || pct_distance(taken.price, level.price) < min_spacing_pct
        });
        if !crowded {
            selected.push(level.clone());
        }
    }

    selected.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    selected
}
