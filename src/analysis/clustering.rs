use itertools::Itertools;

use crate::analysis::candidates::{CandidateLevel, LevelSource, SwingMeta};
use crate::analysis::stats::{mean, within_pct};

/// Candidates that collapsed onto one anchor price.
#[derive(Debug, Clone)]
pub struct LevelGroup {
    /// Price of the first member; later candidates are compared against it.
    pub anchor: f64,
    pub prices: Vec<f64>,
    pub sources: Vec<LevelSource>,
    /// Metadata of every swing member.
    pub swings: Vec<SwingMeta>,
}

impl LevelGroup {
    fn new(candidate: &CandidateLevel) -> Self {
        Self {
            anchor: candidate.price,
            prices: vec![candidate.price],
            sources: vec![candidate.source],
            swings: candidate.swing.into_iter().collect(),
        }
    }

    pub fn representative_price(&self) -> f64 {
        mean(&self.prices)
    }

    /// Contributing sources in first-seen order, without repeats.
    pub fn distinct_sources(&self) -> Vec<LevelSource> {
        self.sources.iter().copied().unique().collect()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Greedy single pass: each candidate joins the first group whose anchor is
/// within `tolerance_pct`, otherwise it opens a new group.
///
/// The outcome depends on candidate order; a candidate is never moved to a
/// closer anchor created later.
pub fn group_candidates(candidates: &[CandidateLevel], tolerance_pct: f64) -> Vec<LevelGroup> {
    let mut groups: Vec<LevelGroup> = Vec::new();
    for candidate in candidates {
        if !candidate.price.is_finite() || candidate.price <= 0.0 {
            continue;
        }
        match groups
            .iter_mut()
            .find(|group| within_pct(candidate.price, group.anchor, tolerance_pct))
        {
            Some(group) => {
                group.prices.push(candidate.price);
                group.sources.push(candidate.source);
                group.swings.extend(candidate.swing);
            }
            None => groups.push(LevelGroup::new(candidate)),
        }
    }
    groups
}
