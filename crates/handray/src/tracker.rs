//! Stateful per-stream entry point.
//!
//! [`Tracker`] owns everything that persists between frames: the pointer
//! state, the current driver body, the latest hand observations and the label
//! buffer. Body frames and depth frames are fed independently; each call runs
//! to completion and the latest body frame wins.

use crate::body::{BodyFrame, BodyId, HandObservation, HandSide};
use crate::config::TrackerConfig;
use crate::frame::{DepthFrame, DepthGrid};
use crate::gesture::{assign_driver, CursorState, DriverChange, GestureController};
use crate::hand::LabelBuffer;
use crate::pipeline::{
    detect_hands, gesture_input, FrameOutcome, FrameReport, HandStateEntry, VisualizationSink,
};

#[derive(Debug, Clone, Copy)]
struct StoredObservation {
    observation: HandObservation,
    depth_frames_seen: u32,
}

/// Hand tracker and pointer controller for one sensor stream.
pub struct Tracker {
    config: TrackerConfig,
    controller: GestureController,
    cursor: CursorState,
    driver: Option<BodyId>,
    observations: [Option<StoredObservation>; 2],
    labels: LabelBuffer,
    frames_processed: u64,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::with_config(TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            controller: GestureController::new(config.gesture.clone()),
            config,
            cursor: CursorState::default(),
            driver: None,
            observations: [None, None],
            labels: LabelBuffer::new(0, 0),
            frames_processed: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Pointer state after the last processed depth frame.
    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    pub fn driver(&self) -> Option<BodyId> {
        self.driver
    }

    /// Labels of the last processed depth frame.
    pub fn labels(&self) -> &LabelBuffer {
        &self.labels
    }

    /// Update the driver and the stored hand observations.
    pub fn on_body_frame(&mut self, frame: &BodyFrame) -> DriverChange {
        let assignment = assign_driver(self.driver, &frame.bodies);
        match assignment.change {
            DriverChange::Assigned(id) => tracing::info!("pointer driver assigned to {id}"),
            DriverChange::Released(id) => tracing::info!("pointer driver {id} lost"),
            DriverChange::Kept(_) | DriverChange::Vacant => {}
        }
        self.driver = assignment.driver;

        let body = self
            .driver
            .and_then(|id| frame.bodies.iter().find(|b| b.is_tracked && b.id == id));
        match body {
            Some(body) => {
                for side in HandSide::EVALUATION_ORDER {
                    let observation = HandObservation::from_joints(
                        body.hand(side),
                        self.config.accept_inferred_joints,
                    );
                    self.observations[side.index()] = Some(StoredObservation {
                        observation,
                        depth_frames_seen: 0,
                    });
                }
            }
            None => self.observations = [None, None],
        }
        assignment.change
    }

    /// Decode and process one raw depth frame.
    ///
    /// Malformed frames are skipped without touching any tracker state.
    pub fn on_depth_frame(&mut self, frame: &DepthFrame<'_>) -> FrameOutcome {
        match frame.to_grid() {
            Ok(grid) => FrameOutcome::Processed(self.on_depth_grid(&grid)),
            Err(e) => {
                tracing::debug!("skipping depth frame: {e}");
                FrameOutcome::Skipped(e)
            }
        }
    }

    /// Process one decoded depth grid.
    pub fn on_depth_grid(&mut self, grid: &DepthGrid) -> FrameReport {
        self.labels.reset_for(grid);

        let stale_after = self.config.stale_after_depth_frames;
        let observations = self.observations.map(|slot| {
            let stored = slot?;
            (stored.depth_frames_seen < stale_after).then_some(stored.observation)
        });
        for stored in self.observations.iter_mut().flatten() {
            stored.depth_frames_seen = stored.depth_frames_seen.saturating_add(1);
        }

        let hands = detect_hands(grid, &mut self.labels, &observations, &self.config.detect);
        let input = gesture_input(self.driver, &hands);
        let step = self.controller.advance(&self.cursor, &input);
        self.cursor = step.cursor;

        let frame_index = self.frames_processed;
        self.frames_processed += 1;
        if !step.events.is_empty() {
            tracing::debug!("frame {}: {:?}", frame_index, step.events);
        }

        FrameReport {
            frame_index,
            hands,
            states: step
                .states
                .into_iter()
                .map(|(side, state)| HandStateEntry { side, state })
                .collect(),
            events: step.events,
        }
    }

    /// Hand the last frame's labels and detections to a visualization sink.
    pub fn present<V: VisualizationSink + ?Sized>(&self, report: &FrameReport, sink: &mut V) {
        sink.present(&self.labels, &report.hands);
    }
}
