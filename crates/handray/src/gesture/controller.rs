//! Per-frame hand gesture state machine driving the pointer.
//!
//! [`GestureController::advance`] is a pure step: it takes the previous
//! [`CursorState`] and this frame's hand inputs and returns the next cursor
//! state together with the pointer events to emit. Hands are evaluated in
//! [`HandSide::EVALUATION_ORDER`]; at most one hand points per frame.

use serde::{Deserialize, Serialize};

use crate::body::{BodyId, HandOpenState, HandSide};
use crate::frame::{DepthSample, Point2D};
use crate::hand::HandDetection;

use super::pointer::{Button, PointerEvent};

/// Cursor-control policy constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Screen pixels per fingertip pixel.
    pub gain: i32,
    /// Fingertip moves up to this length (pixels) are jitter.
    pub jitter_min_px: f32,
    /// Fingertip moves of at least this length (pixels) are tracking jumps.
    pub jump_max_px: f32,
    /// Frames of non-retreating fingertip depth before a dwell click.
    pub dwell_click_frames: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            gain: 5,
            jitter_min_px: 3.0,
            jump_max_px: 20.0,
            dwell_click_frames: 60,
        }
    }
}

/// Pointer state carried from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorState {
    pub last_fingertip_point: Point2D,
    pub last_fingertip_depth: DepthSample,
    pub dwell_frame_count: u32,
    pub active_driver_id: Option<BodyId>,
    pub left_button_down: bool,
    pub right_button_down: bool,
    /// Hand that pointed on the previous frame.
    pub pointing_side: Option<HandSide>,
}

/// Gesture state of one hand for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandState {
    /// Not tracked, or pose unknown.
    Idle,
    /// Fist: holds the left button.
    Closed,
    /// Single extended finger driving the cursor.
    Pointing,
    /// Would point, but another hand already drives the cursor this frame.
    Passive,
    /// Open or lasso without exactly one fingertip.
    OpenNoFingers,
}

/// Gesture-relevant summary of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandInput {
    pub side: HandSide,
    pub tracked: bool,
    pub open_state: HandOpenState,
    pub fingertip_count: usize,
    pub fingertip: Option<Point2D>,
    pub fingertip_depth: DepthSample,
}

impl HandInput {
    pub fn untracked(side: HandSide) -> Self {
        Self {
            side,
            tracked: false,
            open_state: HandOpenState::Unknown,
            fingertip_count: 0,
            fingertip: None,
            fingertip_depth: 0,
        }
    }

    pub fn from_detection(det: &HandDetection) -> Self {
        Self {
            side: det.side,
            tracked: true,
            open_state: det.open_state,
            fingertip_count: det.fingertips.len(),
            fingertip: det.best_fingertip().map(|c| c.point),
            fingertip_depth: det.fingertip_depth.unwrap_or(0),
        }
    }
}

/// Everything the controller needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureInput {
    /// Body currently allowed to drive the pointer.
    pub driver: Option<BodyId>,
    /// Hands of the driver body; missing sides count as untracked.
    pub hands: Vec<HandInput>,
}

/// Result of one controller step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureStep {
    pub cursor: CursorState,
    pub events: Vec<PointerEvent>,
    /// Per-hand states in evaluation order.
    pub states: Vec<(HandSide, HandState)>,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    config: GestureConfig,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    fn classify(input: &HandInput, pointer_taken: &mut bool) -> HandState {
        if !input.tracked {
            return HandState::Idle;
        }
        match input.open_state {
            HandOpenState::Closed => HandState::Closed,
            HandOpenState::Open | HandOpenState::Lasso => {
                if input.fingertip_count == 1 && input.fingertip.is_some() {
                    if *pointer_taken {
                        HandState::Passive
                    } else {
                        *pointer_taken = true;
                        HandState::Pointing
                    }
                } else {
                    HandState::OpenNoFingers
                }
            }
            HandOpenState::Unknown => HandState::Idle,
        }
    }

    fn release_buttons(cursor: &mut CursorState, events: &mut Vec<PointerEvent>) {
        if cursor.left_button_down {
            cursor.left_button_down = false;
            events.push(PointerEvent::ButtonUp {
                button: Button::Left,
            });
        }
        if cursor.right_button_down {
            cursor.right_button_down = false;
            events.push(PointerEvent::ButtonUp {
                button: Button::Right,
            });
        }
    }

    fn reset_dwell(cursor: &mut CursorState) {
        cursor.dwell_frame_count = 0;
        cursor.last_fingertip_depth = 0;
    }

    fn point(
        &self,
        cursor: &mut CursorState,
        side: HandSide,
        tip: Point2D,
        depth: DepthSample,
        events: &mut Vec<PointerEvent>,
    ) {
        if cursor.pointing_side != Some(side) {
            cursor.last_fingertip_point = tip;
            Self::reset_dwell(cursor);
        } else {
            let dx = tip.x - cursor.last_fingertip_point.x;
            let dy = tip.y - cursor.last_fingertip_point.y;
            let magnitude = tip.distance(cursor.last_fingertip_point);
            if magnitude > self.config.jitter_min_px && magnitude < self.config.jump_max_px {
                events.push(PointerEvent::Move {
                    dx: dx * self.config.gain,
                    dy: dy * self.config.gain,
                });
                cursor.last_fingertip_point = tip;
            } else if magnitude >= self.config.jump_max_px {
                tracing::trace!("discarding fingertip jump of {:.1}px", magnitude);
            }
        }

        if depth < cursor.last_fingertip_depth {
            cursor.dwell_frame_count = 0;
        } else {
            cursor.dwell_frame_count = cursor.dwell_frame_count.saturating_add(1);
        }
        cursor.last_fingertip_depth = depth;
        if cursor.dwell_frame_count == self.config.dwell_click_frames {
            events.push(PointerEvent::Click {
                button: Button::Left,
            });
        }
    }

    /// Advance the pointer state by one frame.
    pub fn advance(&self, previous: &CursorState, input: &GestureInput) -> GestureStep {
        let mut cursor = *previous;
        let mut events = Vec::new();

        if cursor.active_driver_id != input.driver {
            if cursor.active_driver_id.is_some() {
                Self::release_buttons(&mut cursor, &mut events);
                Self::reset_dwell(&mut cursor);
                cursor.pointing_side = None;
            }
            cursor.active_driver_id = input.driver;
        }

        let mut pointer_taken = false;
        let mut states = Vec::with_capacity(HandSide::EVALUATION_ORDER.len());
        for side in HandSide::EVALUATION_ORDER {
            let hand = input
                .hands
                .iter()
                .find(|h| h.side == side)
                .copied()
                .unwrap_or_else(|| HandInput::untracked(side));
            let state = if input.driver.is_some() {
                Self::classify(&hand, &mut pointer_taken)
            } else {
                HandState::Idle
            };
            states.push((side, hand, state));
        }

        let any_closed = states.iter().any(|(_, _, s)| *s == HandState::Closed);
        let any_open = states.iter().any(|(_, _, s)| *s == HandState::OpenNoFingers);
        if any_closed && !cursor.left_button_down {
            cursor.left_button_down = true;
            events.push(PointerEvent::ButtonDown {
                button: Button::Left,
            });
        } else if !any_closed && any_open && cursor.left_button_down {
            cursor.left_button_down = false;
            events.push(PointerEvent::ButtonUp {
                button: Button::Left,
            });
        }

        // Dwell belongs to the hand that pointed last frame: it ends when that
        // hand leaves the pointing shape, and an off-hand may only clear it
        // when nothing was pointing.
        let previous_side = cursor.pointing_side;
        for (side, _, state) in &states {
            let was_pointing = previous_side == Some(*side);
            let clears = match state {
                HandState::Pointing => false,
                HandState::Closed | HandState::OpenNoFingers => {
                    was_pointing || previous_side.is_none()
                }
                HandState::Idle | HandState::Passive => was_pointing,
            };
            if clears {
                Self::reset_dwell(&mut cursor);
            }
        }

        let mut pointing_side = None;
        for (side, hand, state) in &states {
            if *state != HandState::Pointing {
                continue;
            }
            if let Some(tip) = hand.fingertip {
                self.point(&mut cursor, *side, tip, hand.fingertip_depth, &mut events);
                pointing_side = Some(*side);
            }
        }
        cursor.pointing_side = pointing_side;

        GestureStep {
            cursor,
            events,
            states: states.into_iter().map(|(side, _, s)| (side, s)).collect(),
        }
    }
}
