use crate::body::HandSide;
use crate::frame::FrameError;
use crate::gesture::{HandState, PointerEvent, PointerSink};
use crate::hand::{HandDetection, LabelBuffer};

/// Gesture state one hand ended up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HandStateEntry {
    pub side: HandSide,
    pub state: HandState,
}

/// Everything one processed depth frame produced.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameReport {
    /// Zero-based count of processed depth frames.
    pub frame_index: u64,
    /// Hands that were detected, in evaluation order.
    pub hands: Vec<HandDetection>,
    /// Gesture state per hand, in evaluation order.
    pub states: Vec<HandStateEntry>,
    /// Pointer events in emission order.
    pub events: Vec<PointerEvent>,
}

impl FrameReport {
    pub fn hand(&self, side: HandSide) -> Option<&HandDetection> {
        self.hands.iter().find(|h| h.side == side)
    }

    pub fn state(&self, side: HandSide) -> Option<HandState> {
        self.states.iter().find(|e| e.side == side).map(|e| e.state)
    }

    /// Forward this frame's events to `sink`.
    pub fn dispatch<S: PointerSink + ?Sized>(&self, sink: &mut S) {
        sink.send_all(&self.events);
    }
}

/// Result of feeding one raw depth frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Frame was malformed and ignored; tracker state is unchanged.
    Skipped(FrameError),
    Processed(FrameReport),
}

impl FrameOutcome {
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Processed(r) => Some(r),
            Self::Skipped(_) => None,
        }
    }
}

/// Optional observer of the classified labels and detections.
pub trait VisualizationSink {
    fn present(&mut self, labels: &LabelBuffer, hands: &[HandDetection]);
}
