//! Greedy peak selection over boundary profiles.
//!
//! The finger selector repeatedly takes the longest remaining ray, accepts it
//! while it stands out from the mean non-zero ray length by the current
//! coefficient, and zeroes a neighbourhood around it. The coefficient decays
//! after every acceptance. The thumb selector is the single-pick special case
//! with a stricter bar.

use crate::body::HandOpenState;
use crate::frame::Point2D;

use super::rays::BoundarySample;

/// Fingertip selection policy.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FingertipSelectConfig {
    /// Acceptance coefficient for the first fingertip.
    pub initial_coefficient: f32,
    /// Coefficient decrease after each accepted fingertip.
    pub coefficient_decrement: f32,
    /// Floor for the decayed coefficient.
    pub min_coefficient: f32,
    /// Profile entries zeroed on each side of an accepted fingertip.
    pub suppression_radius: usize,
    /// Fingertips sought for an open hand.
    pub open_max_candidates: usize,
    /// Fingertips sought for a lasso hand.
    pub lasso_max_candidates: usize,
}

impl Default for FingertipSelectConfig {
    fn default() -> Self {
        Self {
            initial_coefficient: 1.3,
            coefficient_decrement: 0.05,
            min_coefficient: 1.0,
            suppression_radius: 7,
            open_max_candidates: 4,
            lasso_max_candidates: 1,
        }
    }
}

impl FingertipSelectConfig {
    /// How many fingertips to look for given the reported hand pose.
    pub fn max_candidates(&self, state: HandOpenState) -> usize {
        match state {
            HandOpenState::Open => self.open_max_candidates,
            HandOpenState::Lasso => self.lasso_max_candidates,
            HandOpenState::Closed | HandOpenState::Unknown => 0,
        }
    }
}

/// Thumb selection policy.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThumbSelectConfig {
    /// The longest thumb ray must exceed `average * coefficient`.
    pub coefficient: f32,
}

impl Default for ThumbSelectConfig {
    fn default() -> Self {
        Self { coefficient: 1.5 }
    }
}

/// Accepted fingertip or thumb.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FingertipCandidate {
    pub point: Point2D,
    /// Ray length relative to the mean non-zero ray length.
    pub distance_score: f32,
    /// Profile offset the candidate came from.
    pub offset: i32,
    /// Raw ray length (pixels).
    pub distance: u32,
}

/// Mean of the non-zero distances, `None` if every ray came back empty.
pub fn average_nonzero(distances: &[u32]) -> Option<f32> {
    let (sum, n) = distances
        .iter()
        .filter(|&&d| d > 0)
        .fold((0u64, 0usize), |(s, n), &d| (s + d as u64, n + 1));
    (n > 0).then(|| sum as f32 / n as f32)
}

/// Index of the largest distance; ties go to the earliest entry.
fn argmax(distances: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &d) in distances.iter().enumerate() {
        if best.map_or(true, |(_, b)| d > b) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

fn candidate(sample: &BoundarySample, average: f32) -> FingertipCandidate {
    FingertipCandidate {
        point: sample.point,
        distance_score: sample.distance as f32 / average,
        offset: sample.offset,
        distance: sample.distance,
    }
}

/// Select up to `max_candidates` fingertips from a finger-fan profile.
///
/// Candidates are returned longest first.
pub fn select_fingertips<I>(
    samples: I,
    max_candidates: usize,
    cfg: &FingertipSelectConfig,
) -> Vec<FingertipCandidate>
where
    I: IntoIterator<Item = BoundarySample>,
{
    let profile: Vec<BoundarySample> = samples.into_iter().collect();
    let mut distances: Vec<u32> = profile.iter().map(|s| s.distance).collect();
    let Some(average) = average_nonzero(&distances) else {
        return Vec::new();
    };

    let mut coefficient = cfg.initial_coefficient;
    let mut out = Vec::with_capacity(max_candidates);
    while out.len() < max_candidates {
        let Some(k) = argmax(&distances) else {
            break;
        };
        let limit = average * coefficient;
        if distances[k] as f32 <= limit {
            break;
        }
        out.push(candidate(&profile[k], average));

        let lo = k.saturating_sub(cfg.suppression_radius);
        let hi = (k + cfg.suppression_radius + 1).min(distances.len());
        distances[lo..hi].fill(0);

        coefficient = (coefficient - cfg.coefficient_decrement).max(cfg.min_coefficient);
    }
    out
}

/// Select the thumb from a thumb-fan profile.
pub fn select_thumb<I>(samples: I, cfg: &ThumbSelectConfig) -> Option<FingertipCandidate>
where
    I: IntoIterator<Item = BoundarySample>,
{
    let profile: Vec<BoundarySample> = samples.into_iter().collect();
    let distances: Vec<u32> = profile.iter().map(|s| s.distance).collect();
    let average = average_nonzero(&distances)?;
    let k = argmax(&distances)?;
    (distances[k] as f32 > average * cfg.coefficient).then(|| candidate(&profile[k], average))
}
