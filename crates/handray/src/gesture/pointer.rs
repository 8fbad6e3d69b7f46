//! Pointer-device events and the sink they are delivered to.

use serde::{Deserialize, Serialize};

/// Emulated mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Left,
    Right,
}

/// Discrete pointer-device event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerEvent {
    /// Relative cursor motion in screen pixels.
    Move { dx: i32, dy: i32 },
    ButtonDown { button: Button },
    ButtonUp { button: Button },
    /// Press immediately followed by release.
    Click { button: Button },
}

/// Receiver of pointer events. Delivery is fire-and-forget.
pub trait PointerSink {
    fn send(&mut self, event: PointerEvent);

    fn send_all(&mut self, events: &[PointerEvent]) {
        for &event in events {
            self.send(event);
        }
    }
}

impl PointerSink for Vec<PointerEvent> {
    fn send(&mut self, event: PointerEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_string(&PointerEvent::Click {
            button: Button::Left,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"click","button":"left"}"#);
        let mv: PointerEvent = serde_json::from_str(r#"{"kind":"move","dx":-5,"dy":10}"#).unwrap();
        assert_eq!(mv, PointerEvent::Move { dx: -5, dy: 10 });
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<PointerEvent> = Vec::new();
        sink.send_all(&[
            PointerEvent::ButtonDown {
                button: Button::Left,
            },
            PointerEvent::ButtonUp {
                button: Button::Left,
            },
        ]);
        assert_eq!(sink.len(), 2);
        assert!(matches!(sink[0], PointerEvent::ButtonDown { .. }));
    }
}
