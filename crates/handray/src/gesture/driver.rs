//! Choice of the single body allowed to drive the pointer.

use crate::body::{BodyId, TrackedBody};

/// What happened to the driver on this body frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "change", content = "id")]
pub enum DriverChange {
    /// No driver before or after.
    Vacant,
    /// The current driver is still tracked.
    Kept(BodyId),
    /// A new driver was picked.
    Assigned(BodyId),
    /// The previous driver disappeared; a new one may be picked next frame.
    Released(BodyId),
}

/// Driver after one body frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverAssignment {
    pub driver: Option<BodyId>,
    pub change: DriverChange,
}

/// Keep, release, or assign the driver for this body frame.
///
/// A driver is kept while any tracked body carries its id. When it vanishes
/// the slot is cleared and stays empty for this frame; otherwise an empty
/// slot goes to the first tracked body in report order.
pub fn assign_driver(current: Option<BodyId>, bodies: &[TrackedBody]) -> DriverAssignment {
    match current {
        Some(id) if bodies.iter().any(|b| b.is_tracked && b.id == id) => DriverAssignment {
            driver: Some(id),
            change: DriverChange::Kept(id),
        },
        Some(id) => DriverAssignment {
            driver: None,
            change: DriverChange::Released(id),
        },
        None => match bodies.iter().find(|b| b.is_tracked) {
            Some(body) => DriverAssignment {
                driver: Some(body.id),
                change: DriverChange::Assigned(body.id),
            },
            None => DriverAssignment {
                driver: None,
                change: DriverChange::Vacant,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(id: u64, is_tracked: bool) -> TrackedBody {
        TrackedBody {
            id: BodyId(id),
            is_tracked,
            left: Default::default(),
            right: Default::default(),
        }
    }

    #[test]
    fn first_tracked_body_is_assigned() {
        let bodies = [body(3, false), body(5, true), body(9, true)];
        let a = assign_driver(None, &bodies);
        assert_eq!(a.driver, Some(BodyId(5)));
        assert_eq!(a.change, DriverChange::Assigned(BodyId(5)));
    }

    #[test]
    fn driver_is_sticky_while_present() {
        let bodies = [body(1, true), body(5, true)];
        let a = assign_driver(Some(BodyId(5)), &bodies);
        assert_eq!(a.driver, Some(BodyId(5)));
        assert_eq!(a.change, DriverChange::Kept(BodyId(5)));
    }

    #[test]
    fn lost_driver_is_cleared_before_reassignment() {
        let bodies = [body(1, true), body(5, false)];
        let a = assign_driver(Some(BodyId(5)), &bodies);
        assert_eq!(a.driver, None);
        assert_eq!(a.change, DriverChange::Released(BodyId(5)));
        let b = assign_driver(a.driver, &bodies);
        assert_eq!(b.driver, Some(BodyId(1)));
    }

    #[test]
    fn no_bodies_leaves_slot_vacant() {
        let a = assign_driver(None, &[]);
        assert_eq!(a.driver, None);
        assert_eq!(a.change, DriverChange::Vacant);
    }
}
