//! Stateless per-frame stages.

use crate::body::{BodyId, HandObservation, HandSide};
use crate::frame::DepthGrid;
use crate::gesture::{GestureInput, HandInput};
use crate::hand::{detect_hand, HandDetectConfig, HandDetection, LabelBuffer};

/// Detect every hand that has an observation this frame.
///
/// `observations` is indexed by [`HandSide::index`]. Hands are processed in
/// [`HandSide::EVALUATION_ORDER`] into one shared label buffer; each hand's
/// rays only read its own window, so the result per hand does not depend on
/// the other.
pub(crate) fn detect_hands(
    grid: &DepthGrid,
    labels: &mut LabelBuffer,
    observations: &[Option<HandObservation>; 2],
    cfg: &HandDetectConfig,
) -> Vec<HandDetection> {
    HandSide::EVALUATION_ORDER
        .into_iter()
        .filter_map(|side| {
            let obs = observations[side.index()].as_ref()?;
            detect_hand(grid, labels, side, obs, cfg)
        })
        .collect()
}

/// Controller input for one frame.
///
/// A hand without a detection (no observation, untracked joints, or palm off
/// the depth data) is reported as untracked.
pub(crate) fn gesture_input(driver: Option<BodyId>, detections: &[HandDetection]) -> GestureInput {
    let hands = HandSide::EVALUATION_ORDER
        .into_iter()
        .map(|side| {
            detections
                .iter()
                .find(|d| d.side == side)
                .map(HandInput::from_detection)
                .unwrap_or_else(|| HandInput::untracked(side))
        })
        .collect();
    GestureInput { driver, hands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::HandOpenState;
    use crate::frame::Point2D;
    use crate::test_utils::{palm_slab_grid, pointing_hand_grid, POINTING_PALM, POINTING_WRIST};

    #[test]
    fn only_observed_hands_are_detected() {
        let grid = pointing_hand_grid();
        let mut labels = LabelBuffer::for_grid(&grid);
        let mut observations = [None, None];
        observations[HandSide::Right.index()] = Some(HandObservation::tracked(
            POINTING_PALM,
            POINTING_WRIST,
            HandOpenState::Open,
        ));
        let hands = detect_hands(&grid, &mut labels, &observations, &HandDetectConfig::default());
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].side, HandSide::Right);

        let input = gesture_input(Some(BodyId(3)), &hands);
        assert_eq!(input.hands.len(), 2);
        assert!(input.hands[0].tracked);
        assert_eq!(input.hands[0].fingertip_count, 1);
        assert_eq!(input.hands[1], HandInput::untracked(HandSide::Left));
    }

    #[test]
    fn both_hands_share_a_frame_without_interference() {
        let cfg = HandDetectConfig::default();
        let left = HandObservation::tracked(POINTING_PALM, POINTING_WRIST, HandOpenState::Open);
        let scenes = [
            (pointing_hand_grid(), Point2D::new(300, 120), HandOpenState::Open, 1),
            (palm_slab_grid(), Point2D::new(310, 95), HandOpenState::Closed, 0),
        ];
        for (grid, right_palm, right_state, tips) in scenes {
            let right = HandObservation::tracked(
                right_palm,
                Point2D::new(right_palm.x, right_palm.y + 60),
                right_state,
            );

            let mut labels = LabelBuffer::for_grid(&grid);
            let solo = detect_hands(&grid, &mut labels, &[Some(left), None], &cfg);
            assert_eq!(solo.len(), 1);
            assert_eq!(solo[0].fingertips.len(), tips);

            let mut labels = LabelBuffer::for_grid(&grid);
            let mut observations = [None, None];
            observations[HandSide::Left.index()] = Some(left);
            observations[HandSide::Right.index()] = Some(right);
            let both = detect_hands(&grid, &mut labels, &observations, &cfg);
            assert_eq!(both.len(), 2);
            assert_eq!(both[0].side, HandSide::Right);
            assert_eq!(both[1], solo[0]);

            let input = gesture_input(Some(BodyId(1)), &both);
            let left_input = input.hands.iter().find(|h| h.side == HandSide::Left).unwrap();
            assert_eq!(left_input.fingertip_count, tips);
        }
    }

    #[test]
    fn palm_off_depth_data_is_untracked() {
        let grid = DepthGrid::filled(64, 64, 0);
        let mut labels = LabelBuffer::for_grid(&grid);
        let observations = [
            Some(HandObservation::tracked(
                crate::frame::Point2D::new(30, 30),
                crate::frame::Point2D::new(30, 50),
                HandOpenState::Closed,
            )),
            None,
        ];
        let hands = detect_hands(&grid, &mut labels, &observations, &HandDetectConfig::default());
        assert!(hands.is_empty());
        let input = gesture_input(Some(BodyId(1)), &hands);
        assert!(input.hands.iter().all(|h| !h.tracked));
    }
}
