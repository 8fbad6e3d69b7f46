//! Hand-region classification and fingertip detection.
//!
//! Stages:
//! 1. **Classify** – bucket the window around the palm by depth relative to the
//!    palm plane (`classify`).
//! 2. **Cast** – walk the finger and thumb ray fans over the label buffer
//!    (`rays`).
//! 3. **Select** – greedy peak selection of fingertips and thumb (`select`).
//! 4. **Detect** – orchestrates the above for one hand (`detect`).

pub(crate) mod classify;
pub(crate) mod detect;
pub(crate) mod labels;
pub(crate) mod rays;
pub(crate) mod select;

pub use classify::{classify_hand_region, depth_bucket, RegionConfig, RegionWindow};
pub use detect::{detect_hand, HandDetectConfig, HandDetection};
pub use labels::{LabelBuffer, BACKGROUND, BUCKET_COUNT, GUIDE};
pub use rays::{
    finger_rays, hand_axis, thumb_rays, BoundarySample, FingerFanConfig, FingerRays,
    ThumbFanConfig, ThumbRays,
};
pub use select::{
    average_nonzero, select_fingertips, select_thumb, FingertipCandidate, FingertipSelectConfig,
    ThumbSelectConfig,
};
