//! handray — depth-image hand tracking and pointer emulation.
//!
//! Given a depth frame and the palm/wrist joints of the tracked body, the
//! crate finds fingertips and the thumb of each hand and turns a single
//! extended finger into pointer motion and clicks. The stages are:
//!
//! 1. **Classify** – bucket a window around the palm by depth relative to the
//!    palm plane.
//! 2. **Cast** – walk parallel finger rays and a rotated thumb fan outward from
//!    the palm to the silhouette boundary.
//! 3. **Select** – greedy peak picking with neighbourhood suppression.
//! 4. **Gesture** – per-frame hand state machine emitting pointer events.
//!
//! # Public API
//! - [`Tracker`] is the stateful entry point: feed it [`BodyFrame`]s and
//!   [`DepthFrame`]s, read back [`FrameReport`]s.
//! - [`TrackerConfig`] gathers every tunable constant.
//! - [`detect_hand`] and [`GestureController`] expose the stages directly.

mod body;
mod config;
mod frame;
mod gesture;
mod hand;
mod pipeline;
mod tracker;

#[cfg(test)]
mod test_utils;

pub use body::{
    BodyFrame, BodyId, HandJoints, HandObservation, HandOpenState, HandSide, Joint,
    JointTracking, TrackedBody,
};
pub use config::{ConfigError, TrackerConfig};
pub use frame::{DepthFrame, DepthGrid, DepthSample, FrameError, Point2D, DEPTH_BYTES_PER_PIXEL};
pub use gesture::{
    assign_driver, Button, CursorState, DriverAssignment, DriverChange, GestureConfig,
    GestureController, GestureInput, GestureStep, HandInput, HandState, PointerEvent, PointerSink,
};
pub use hand::{
    average_nonzero, classify_hand_region, depth_bucket, detect_hand, finger_rays, hand_axis,
    select_fingertips, select_thumb, thumb_rays, BoundarySample, FingerFanConfig, FingerRays,
    FingertipCandidate, FingertipSelectConfig, HandDetectConfig, HandDetection, LabelBuffer,
    RegionConfig, RegionWindow, ThumbFanConfig, ThumbRays, ThumbSelectConfig, BACKGROUND,
    BUCKET_COUNT, GUIDE,
};
pub use pipeline::{FrameOutcome, FrameReport, HandStateEntry, VisualizationSink};
pub use tracker::Tracker;
