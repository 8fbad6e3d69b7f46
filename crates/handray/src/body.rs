//! Skeletal records supplied by the body source.
//!
//! Joint positions arrive already projected into depth-grid pixel space. The
//! detector only consumes the palm and wrist of each hand plus the
//! open/closed/lasso classification.

use serde::{Deserialize, Serialize};

use crate::frame::Point2D;

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Fixed order in which hands compete for the pointer each frame.
    pub const EVALUATION_ORDER: [HandSide; 2] = [HandSide::Right, HandSide::Left];

    /// Slot index for per-side arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Discrete hand pose reported by the skeletal tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandOpenState {
    Open,
    Closed,
    Lasso,
    #[default]
    Unknown,
}

/// Per-joint tracking confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointTracking {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

impl JointTracking {
    /// Whether a joint with this state may feed detection.
    pub fn is_usable(self, accept_inferred: bool) -> bool {
        match self {
            Self::Tracked => true,
            Self::Inferred => accept_inferred,
            Self::NotTracked => false,
        }
    }
}

/// One projected joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Joint {
    pub position: Point2D,
    #[serde(default)]
    pub tracking: JointTracking,
}

impl Joint {
    pub fn tracked(x: i32, y: i32) -> Self {
        Self {
            position: Point2D::new(x, y),
            tracking: JointTracking::Tracked,
        }
    }
}

/// Hand-related joints of one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandJoints {
    #[serde(default)]
    pub palm: Joint,
    #[serde(default)]
    pub wrist: Joint,
    #[serde(default)]
    pub open_state: HandOpenState,
}

/// Stable identifier of a tracked body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u64);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// One body record from the skeletal tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedBody {
    pub id: BodyId,
    pub is_tracked: bool,
    #[serde(default)]
    pub left: HandJoints,
    #[serde(default)]
    pub right: HandJoints,
}

impl TrackedBody {
    pub fn hand(&self, side: HandSide) -> &HandJoints {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }
}

/// All bodies reported for one skeletal time step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFrame {
    #[serde(default)]
    pub bodies: Vec<TrackedBody>,
}

/// Per-hand input consumed by the detector for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandObservation {
    pub palm: Point2D,
    pub wrist: Point2D,
    pub palm_valid: bool,
    pub wrist_valid: bool,
    pub open_state: HandOpenState,
}

impl HandObservation {
    /// Observation with both joints tracked.
    pub fn tracked(palm: Point2D, wrist: Point2D, open_state: HandOpenState) -> Self {
        Self {
            palm,
            wrist,
            palm_valid: true,
            wrist_valid: true,
            open_state,
        }
    }

    pub fn from_joints(joints: &HandJoints, accept_inferred: bool) -> Self {
        Self {
            palm: joints.palm.position,
            wrist: joints.wrist.position,
            palm_valid: joints.palm.tracking.is_usable(accept_inferred),
            wrist_valid: joints.wrist.tracking.is_usable(accept_inferred),
            open_state: joints.open_state,
        }
    }

    /// Both palm and wrist are valid this frame.
    pub fn is_trackable(&self) -> bool {
        self.palm_valid && self.wrist_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inferred_joints_follow_policy() {
        let joints = HandJoints {
            palm: Joint {
                position: Point2D::new(10, 10),
                tracking: JointTracking::Inferred,
            },
            wrist: Joint::tracked(10, 30),
            open_state: HandOpenState::Open,
        };
        assert!(!HandObservation::from_joints(&joints, false).is_trackable());
        assert!(HandObservation::from_joints(&joints, true).is_trackable());
    }

    #[test]
    fn body_frame_parses_with_defaults() {
        let json = r#"{"bodies":[{"id":7,"is_tracked":true,
            "right":{"palm":{"position":{"x":1,"y":2},"tracking":"tracked"},"open_state":"lasso"}}]}"#;
        let frame: BodyFrame = serde_json::from_str(json).unwrap();
        let body = &frame.bodies[0];
        assert_eq!(body.id, BodyId(7));
        assert_eq!(body.right.open_state, HandOpenState::Lasso);
        assert_eq!(body.right.wrist.tracking, JointTracking::NotTracked);
        assert_eq!(body.left, HandJoints::default());
    }
}
