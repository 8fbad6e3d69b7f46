//! Pointer control from per-hand detections.
//!
//! Stages:
//! - `driver`: pick the one tracked body allowed to move the pointer
//! - `controller`: per-frame hand state machine (move, dwell click, press/release)
//! - `pointer`: output events and the sink they are dispatched to

pub(crate) mod controller;
pub(crate) mod driver;
pub(crate) mod pointer;

pub use controller::{
    CursorState, GestureConfig, GestureController, GestureInput, GestureStep, HandInput,
    HandState,
};
pub use driver::{assign_driver, DriverAssignment, DriverChange};
pub use pointer::{Button, PointerEvent, PointerSink};
