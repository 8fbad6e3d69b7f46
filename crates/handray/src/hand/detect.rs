//! Per-hand detection: classify → cast → select → mark.

use crate::body::{HandObservation, HandOpenState, HandSide};
use crate::frame::{DepthGrid, DepthSample, Point2D};

use super::classify::{classify_hand_region, RegionConfig, RegionWindow};
use super::labels::LabelBuffer;
use super::rays::{finger_rays, thumb_rays, FingerFanConfig, ThumbFanConfig};
use super::select::{
    select_fingertips, select_thumb, FingertipCandidate, FingertipSelectConfig, ThumbSelectConfig,
};

/// All per-hand detection parameters.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HandDetectConfig {
    pub region: RegionConfig,
    pub finger_fan: FingerFanConfig,
    pub thumb_fan: ThumbFanConfig,
    pub fingertips: FingertipSelectConfig,
    pub thumb: ThumbSelectConfig,
}

/// Detection result for one hand in one frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandDetection {
    pub side: HandSide,
    pub palm: Point2D,
    pub wrist: Point2D,
    pub open_state: HandOpenState,
    /// Classified window and palm reference depth.
    pub window: RegionWindow,
    /// Accepted fingertips, longest ray first.
    pub fingertips: Vec<FingertipCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<FingertipCandidate>,
    /// Depth at the best fingertip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingertip_depth: Option<DepthSample>,
}

impl HandDetection {
    /// Fingertip with the longest ray.
    pub fn best_fingertip(&self) -> Option<&FingertipCandidate> {
        self.fingertips.first()
    }
}

/// Run detection for one hand.
///
/// Returns `None` when the hand is not trackable this frame or its palm does
/// not land on a valid depth sample. The label buffer is updated in place:
/// the hand window is classified and guide lines are drawn from the palm to
/// every accepted fingertip. Rays only see this hand's window, so a buffer
/// shared with a hand detected earlier in the frame gives the same result as
/// a fresh one.
pub fn detect_hand(
    grid: &DepthGrid,
    labels: &mut LabelBuffer,
    side: HandSide,
    observation: &HandObservation,
    cfg: &HandDetectConfig,
) -> Option<HandDetection> {
    if !observation.is_trackable() {
        tracing::trace!("{} hand not tracked", side.as_str());
        return None;
    }
    let palm = observation.palm;
    let wrist = observation.wrist;
    let Some(window) = classify_hand_region(grid, palm, labels, &cfg.region) else {
        tracing::debug!(
            "{} palm {:?} has no valid depth sample; skipping hand",
            side.as_str(),
            palm
        );
        return None;
    };

    let max_candidates = cfg.fingertips.max_candidates(observation.open_state);
    let fingertips = match finger_rays(labels, palm, wrist, &cfg.finger_fan) {
        Some(rays) if max_candidates > 0 => {
            select_fingertips(rays.within(window), max_candidates, &cfg.fingertips)
        }
        _ => Vec::new(),
    };
    for tip in &fingertips {
        labels.draw_guide(palm, tip.point);
    }

    let thumb = thumb_rays(labels, palm, wrist, side, &cfg.thumb_fan)
        .and_then(|rays| select_thumb(rays.within(window), &cfg.thumb));

    let fingertip_depth = fingertips.first().and_then(|c| grid.get(c.point));

    tracing::trace!(
        "{} hand: {} fingertip(s), thumb={}, palm depth {} mm",
        side.as_str(),
        fingertips.len(),
        thumb.is_some(),
        window.palm_depth
    );

    Some(HandDetection {
        side,
        palm,
        wrist,
        open_state: observation.open_state,
        window,
        fingertips,
        thumb,
        fingertip_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::labels::GUIDE;
    use crate::test_utils::{
        flat_wall_pointing_grid, palm_slab_grid, pointing_hand_grid, POINTING_PALM, POINTING_WRIST,
    };
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn observe(open_state: HandOpenState) -> HandObservation {
        HandObservation::tracked(POINTING_PALM, POINTING_WRIST, open_state)
    }

    #[test]
    fn untracked_hand_is_skipped() {
        let grid = pointing_hand_grid();
        let mut labels = LabelBuffer::for_grid(&grid);
        let mut obs = observe(HandOpenState::Open);
        obs.wrist_valid = false;
        let cfg = HandDetectConfig::default();
        assert!(detect_hand(&grid, &mut labels, HandSide::Right, &obs, &cfg).is_none());
        assert_eq!(labels, LabelBuffer::for_grid(&grid));
    }

    #[test]
    fn pointing_hand_yields_one_tip_and_no_thumb() {
        let grid = pointing_hand_grid();
        let mut labels = LabelBuffer::for_grid(&grid);
        let det = detect_hand(
            &grid,
            &mut labels,
            HandSide::Right,
            &observe(HandOpenState::Open),
            &HandDetectConfig::default(),
        )
        .unwrap();
        assert_eq!(det.fingertips.len(), 1, "{:?}", det.fingertips);
        let tip = det.best_fingertip().unwrap();
        assert!(tip.point.distance(Point2D::new(160, 150)) <= 3.0, "{:?}", tip.point);
        assert_eq!(det.fingertip_depth, Some(900));
        assert!(det.thumb.is_none());
        assert_eq!(det.window.palm_depth, 1000);
        assert!(labels.as_raw().contains(&GUIDE));
    }

    #[test]
    fn closed_hand_skips_finger_search() {
        let grid = pointing_hand_grid();
        let mut labels = LabelBuffer::for_grid(&grid);
        let det = detect_hand(
            &grid,
            &mut labels,
            HandSide::Right,
            &observe(HandOpenState::Closed),
            &HandDetectConfig::default(),
        )
        .unwrap();
        assert!(det.fingertips.is_empty());
        assert_eq!(det.fingertip_depth, None);
    }

    #[test]
    fn flat_wall_hides_a_patch_in_front_of_the_palm_plane() {
        // Every finger ray stops at the window top, so the 900 mm patch never
        // stands out from the mean ray length.
        let grid = flat_wall_pointing_grid();
        let mut labels = LabelBuffer::for_grid(&grid);
        let det = detect_hand(
            &grid,
            &mut labels,
            HandSide::Right,
            &observe(HandOpenState::Open),
            &HandDetectConfig::default(),
        )
        .unwrap();
        assert_eq!(det.window.palm_depth, 1000);
        assert!(det.fingertips.is_empty(), "{:?}", det.fingertips);
        assert!(det.thumb.is_none());
        assert_eq!(det.fingertip_depth, None);
    }

    #[test]
    fn earlier_hand_in_shared_buffer_does_not_leak_fingertips() {
        let grid = palm_slab_grid();
        let cfg = HandDetectConfig::default();
        let left = observe(HandOpenState::Open);
        let right = HandObservation::tracked(
            Point2D::new(310, 95),
            Point2D::new(310, 155),
            HandOpenState::Closed,
        );

        let mut alone = LabelBuffer::for_grid(&grid);
        let solo = detect_hand(&grid, &mut alone, HandSide::Left, &left, &cfg).unwrap();
        assert!(solo.fingertips.is_empty(), "{:?}", solo.fingertips);

        let mut shared = LabelBuffer::for_grid(&grid);
        let first = detect_hand(&grid, &mut shared, HandSide::Right, &right, &cfg).unwrap();
        assert_eq!(first.window.palm_depth, 2500);
        let second = detect_hand(&grid, &mut shared, HandSide::Left, &left, &cfg).unwrap();
        assert_eq!(second.fingertips, solo.fingertips);
        assert_eq!(second.thumb, solo.thumb);
    }

    #[test]
    fn second_pointing_hand_matches_its_solo_detection() {
        let grid = pointing_hand_grid();
        let cfg = HandDetectConfig::default();
        let left = observe(HandOpenState::Open);
        // Open hand on the backdrop whose window overlaps the top right of
        // the left window.
        let right = HandObservation::tracked(
            Point2D::new(300, 120),
            Point2D::new(300, 180),
            HandOpenState::Open,
        );

        let mut alone = LabelBuffer::for_grid(&grid);
        let solo = detect_hand(&grid, &mut alone, HandSide::Left, &left, &cfg).unwrap();
        assert_eq!(solo.fingertips.len(), 1);

        let mut shared = LabelBuffer::for_grid(&grid);
        detect_hand(&grid, &mut shared, HandSide::Right, &right, &cfg).unwrap();
        let second = detect_hand(&grid, &mut shared, HandSide::Left, &left, &cfg).unwrap();
        assert_eq!(second, solo);
    }

    #[test]
    fn detection_is_deterministic() {
        let grid = pointing_hand_grid();
        let cfg = HandDetectConfig::default();
        let run = || {
            let mut labels = LabelBuffer::for_grid(&grid);
            let det = detect_hand(&grid, &mut labels, HandSide::Right, &observe(HandOpenState::Open), &cfg);
            (det, labels)
        };
        let (a, la) = run();
        let (b, lb) = run();
        assert_eq!(a, b);
        assert_eq!(la, lb);
    }

    #[test]
    fn random_palm_and_wrist_near_edges_never_panic() {
        let grid = pointing_hand_grid();
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        let cfg = HandDetectConfig::default();
        let mut rng = StdRng::seed_from_u64(424_512);
        let mut labels = LabelBuffer::for_grid(&grid);
        let edge = |rng: &mut StdRng, n: i32| -> i32 {
            if rng.gen_bool(0.5) {
                rng.gen_range(-5..12)
            } else {
                rng.gen_range(n - 12..n + 5)
            }
        };
        let extremes = [i32::MIN, i32::MIN + 1, -1, 0, i32::MAX - 1, i32::MAX];
        for k in 0..600 {
            let palm = Point2D::new(edge(&mut rng, w), edge(&mut rng, h));
            // Joint positions come from outside; every sixth wrist is wild.
            let wrist = if k % 6 == 0 {
                Point2D::new(
                    extremes[rng.gen_range(0..extremes.len())],
                    extremes[rng.gen_range(0..extremes.len())],
                )
            } else {
                Point2D::new(
                    palm.x + rng.gen_range(-80..80),
                    palm.y + rng.gen_range(-80..80),
                )
            };
            let state = match rng.gen_range(0..4) {
                0 => HandOpenState::Open,
                1 => HandOpenState::Closed,
                2 => HandOpenState::Lasso,
                _ => HandOpenState::Unknown,
            };
            let side = if rng.gen_bool(0.5) { HandSide::Left } else { HandSide::Right };
            labels.reset_for(&grid);
            let obs = HandObservation::tracked(palm, wrist, state);
            if let Some(det) = detect_hand(&grid, &mut labels, side, &obs, &cfg) {
                assert!(grid.contains(det.palm));
                for tip in det.fingertips.iter().chain(det.thumb.iter()) {
                    assert!(grid.contains(tip.point), "{:?}", tip.point);
                }
            }
        }
    }
}
