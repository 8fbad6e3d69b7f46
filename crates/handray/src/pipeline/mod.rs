//! Per-frame glue between hand detection and pointer control.
//!
//! Stages, run once per depth frame:
//! 1. reset the label buffer to the new grid
//! 2. `detect_hands`: classify, cast and select for every fresh observation
//! 3. `gesture_input`: fold detections into the controller input
//! 4. [`crate::GestureController::advance`] produces the pointer events
//!
//! The stateful driver of these stages is [`crate::Tracker`].

mod report;
mod run;

pub use report::{FrameOutcome, FrameReport, HandStateEntry, VisualizationSink};

pub(crate) use run::{detect_hands, gesture_input};
