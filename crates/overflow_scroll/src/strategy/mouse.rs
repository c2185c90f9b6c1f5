//! Mouse thumb dragging
//!
//! Pressing the thumb captures an anchor so that the pointer's distance from
//! the track origin maps linearly onto the scroll offset. Moves and the
//! release are tracked at document level so the drag survives the pointer
//! leaving the thumb.

use std::sync::Arc;

use overflow_core::events::event_types;
use overflow_core::{EventTarget, EventType, InputEvent, StateTransitions};

use super::{InputStrategy, ScrollRequest, ScrollRequests, ScrollView, StrategyKind};
use crate::config::OverflowConfig;

/// Thumb drag tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

impl StateTransitions for DragState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        match (self, event) {
            (DragState::Idle, event_types::PRESS) => Some(DragState::Dragging),
            (DragState::Dragging, event_types::RELEASE) => Some(DragState::Idle),
            _ => None,
        }
    }
}

pub struct MouseThumbDrag {
    config: Arc<OverflowConfig>,
    state: DragState,
    /// Offset at which the pointer would sit exactly on the track origin
    anchor: f32,
}

impl MouseThumbDrag {
    pub fn new(config: Arc<OverflowConfig>) -> Self {
        Self {
            config,
            state: DragState::Idle,
            anchor: 0.0,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    fn press_thumb(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        let ratio = view.geometry.thumb.thumb_ratio;
        let Some(y) = event.position() else {
            return ScrollRequests::new();
        };
        if ratio <= 0.0 {
            return ScrollRequests::new();
        }

        self.anchor = view.offset() - (y - view.track_origin()) / ratio;
        self.state.send(event_types::PRESS);
        event.prevent_default();
        tracing::trace!("thumb drag started at y={} anchor={}", y, self.anchor);

        let mut requests = ScrollRequests::new();
        requests.push(ScrollRequest::StopAnimation);
        requests
    }

    fn drag(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        let mut requests = ScrollRequests::new();
        if self.state != DragState::Dragging {
            return requests;
        }
        let ratio = view.geometry.thumb.thumb_ratio;
        let Some(y) = event.position() else {
            return requests;
        };
        event.prevent_default();
        // Content may have shrunk to fit mid-drag
        if ratio <= 0.0 {
            return requests;
        }

        requests.push(ScrollRequest::Write {
            offset: self.anchor + (y - view.track_origin()) / ratio,
            timestamp: event.timestamp,
        });
        requests
    }

    fn step(&self, event: &mut InputEvent, view: &ScrollView<'_>, direction: f32) -> ScrollRequests {
        let mut requests = ScrollRequests::new();
        if !self.config.arrows_enabled() {
            return requests;
        }
        event.prevent_default();
        let step = self.config.arrow_step(view.geometry.metrics.viewport_extent());
        requests.push(ScrollRequest::Settle {
            offset: view.offset() + direction * step,
            timestamp: event.timestamp,
        });
        requests
    }

    fn page(&self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        let mut requests = ScrollRequests::new();
        if !self.config.track_enabled() || !view.geometry.metrics.has_overflow() {
            return requests;
        }
        let Some(y) = event.position() else {
            return requests;
        };

        let thumb_top = view.viewport_origin + view.geometry.current_thumb_position();
        let thumb_bottom = thumb_top + view.geometry.thumb.thumb_length;
        let page = view.geometry.metrics.viewport_extent();
        let offset = if y < thumb_top {
            view.offset() - page
        } else if y > thumb_bottom {
            view.offset() + page
        } else {
            return requests;
        };

        event.prevent_default();
        requests.push(ScrollRequest::Settle {
            offset,
            timestamp: event.timestamp,
        });
        requests
    }
}

impl InputStrategy for MouseThumbDrag {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MouseThumbDrag
    }

    fn bindings(&self) -> Vec<(EventTarget, EventType)> {
        let mut bindings = vec![
            (EventTarget::Thumb, event_types::PRESS),
            (EventTarget::Document, event_types::MOVE),
            (EventTarget::Document, event_types::RELEASE),
        ];
        if self.config.track_enabled() {
            bindings.push((EventTarget::Track, event_types::PRESS));
        }
        if self.config.arrows_enabled() {
            bindings.push((EventTarget::ArrowUp, event_types::PRESS));
            bindings.push((EventTarget::ArrowDown, event_types::PRESS));
        }
        bindings
    }

    fn interrupts_settle(&self, event: &InputEvent) -> bool {
        event.target == EventTarget::Thumb && event.event_type == event_types::PRESS
    }

    fn handle(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        match (event.target, event.event_type) {
            (EventTarget::Thumb, event_types::PRESS) => self.press_thumb(event, view),
            (EventTarget::Document, event_types::MOVE) => self.drag(event, view),
            (EventTarget::Document, event_types::RELEASE) => {
                if self.state.send(event_types::RELEASE) {
                    event.prevent_default();
                    tracing::trace!("thumb drag ended");
                }
                ScrollRequests::new()
            }
            (EventTarget::ArrowUp, event_types::PRESS) => self.step(event, view, -1.0),
            (EventTarget::ArrowDown, event_types::PRESS) => self.step(event, view, 1.0),
            (EventTarget::Track, event_types::PRESS) => self.page(event, view),
            _ => ScrollRequests::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ScrollClock;
    use crate::geometry::{Geometry, GeometryModel};

    fn geometry(offset: f32) -> Geometry {
        GeometryModel::from_config(&OverflowConfig::default()).compute(200.0, 1000.0, offset)
    }

    fn view<'a>(geometry: &'a Geometry, clock: &'a ScrollClock) -> ScrollView<'a> {
        ScrollView {
            geometry,
            clock,
            viewport_origin: 100.0,
        }
    }

    fn pointer(event_type: EventType, target: EventTarget, y: f32, ts: f64) -> InputEvent {
        InputEvent::pointer(event_type, target, y, ts)
    }

    #[test]
    fn test_drag_state_transitions() {
        let mut state = DragState::default();
        assert!(!state.send(event_types::RELEASE));
        assert!(state.send(event_types::PRESS));
        assert_eq!(state, DragState::Dragging);
        assert!(!state.send(event_types::PRESS));
        assert!(state.send(event_types::RELEASE));
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn test_press_anchors_and_move_writes() {
        let mut strategy = MouseThumbDrag::new(Arc::new(OverflowConfig::default()));
        let clock = ScrollClock::new();
        let g = geometry(0.0);
        let v = view(&g, &clock);

        let mut press = pointer(event_types::PRESS, EventTarget::Thumb, 115.0, 1.0);
        let requests = strategy.handle(&mut press, &v);
        assert_eq!(requests.as_slice(), &[ScrollRequest::StopAnimation]);
        assert!(press.default_prevented);
        assert_eq!(strategy.state(), DragState::Dragging);

        let mut mv = pointer(event_types::MOVE, EventTarget::Document, 115.0 + 65.0, 2.0);
        let requests = strategy.handle(&mut mv, &v);
        match requests.as_slice() {
            [ScrollRequest::Write { offset, timestamp }] => {
                assert!((offset - 400.0).abs() < 1e-2);
                assert_eq!(*timestamp, 2.0);
            }
            other => panic!("unexpected requests {other:?}"),
        }

        let mut up = pointer(event_types::RELEASE, EventTarget::Document, 180.0, 3.0);
        assert!(strategy.handle(&mut up, &v).is_empty());
        assert_eq!(strategy.state(), DragState::Idle);

        // Moves after release are ignored
        let mut mv = pointer(event_types::MOVE, EventTarget::Document, 200.0, 4.0);
        assert!(strategy.handle(&mut mv, &v).is_empty());
        assert!(!mv.default_prevented);
    }

    #[test]
    fn test_press_without_overflow_is_noop() {
        let mut strategy = MouseThumbDrag::new(Arc::new(OverflowConfig::default()));
        let clock = ScrollClock::new();
        let g = GeometryModel::default().compute(200.0, 150.0, 0.0);
        let v = view(&g, &clock);

        let mut press = pointer(event_types::PRESS, EventTarget::Thumb, 150.0, 1.0);
        assert!(strategy.handle(&mut press, &v).is_empty());
        assert_eq!(strategy.state(), DragState::Idle);
        assert!(!press.default_prevented);
    }

    #[test]
    fn test_arrows_step_by_fraction() {
        let mut strategy = MouseThumbDrag::new(Arc::new(OverflowConfig::default()));
        let clock = ScrollClock::new();
        let g = geometry(100.0);
        let v = view(&g, &clock);

        let mut down = pointer(event_types::PRESS, EventTarget::ArrowDown, 290.0, 5.0);
        assert_eq!(
            strategy.handle(&mut down, &v).as_slice(),
            &[ScrollRequest::Settle { offset: 120.0, timestamp: 5.0 }]
        );

        let mut up = pointer(event_types::PRESS, EventTarget::ArrowUp, 105.0, 6.0);
        assert_eq!(
            strategy.handle(&mut up, &v).as_slice(),
            &[ScrollRequest::Settle { offset: 80.0, timestamp: 6.0 }]
        );
    }

    #[test]
    fn test_track_press_pages_toward_pointer() {
        let mut strategy = MouseThumbDrag::new(Arc::new(OverflowConfig::default()));
        let clock = ScrollClock::new();
        let g = geometry(400.0);
        let v = view(&g, &clock);
        // Thumb spans 100 + 15 + 65 = 180 .. 220
        let mut above = pointer(event_types::PRESS, EventTarget::Track, 130.0, 1.0);
        assert_eq!(
            strategy.handle(&mut above, &v).as_slice(),
            &[ScrollRequest::Settle { offset: 200.0, timestamp: 1.0 }]
        );

        let mut below = pointer(event_types::PRESS, EventTarget::Track, 260.0, 2.0);
        assert_eq!(
            strategy.handle(&mut below, &v).as_slice(),
            &[ScrollRequest::Settle { offset: 600.0, timestamp: 2.0 }]
        );

        let mut on_thumb = pointer(event_types::PRESS, EventTarget::Track, 200.0, 3.0);
        assert!(strategy.handle(&mut on_thumb, &v).is_empty());
    }

    #[test]
    fn test_bindings_follow_config() {
        let full = MouseThumbDrag::new(Arc::new(OverflowConfig::default()));
        assert_eq!(full.bindings().len(), 6);

        let minimal = MouseThumbDrag::new(Arc::new(OverflowConfig::minimal()));
        assert_eq!(
            minimal.bindings(),
            vec![
                (EventTarget::Thumb, event_types::PRESS),
                (EventTarget::Document, event_types::MOVE),
                (EventTarget::Document, event_types::RELEASE),
            ]
        );
    }

    #[test]
    fn test_only_thumb_press_interrupts_settle() {
        let strategy = MouseThumbDrag::new(Arc::new(OverflowConfig::default()));
        assert!(strategy.interrupts_settle(&pointer(event_types::PRESS, EventTarget::Thumb, 120.0, 1.0)));
        assert!(!strategy.interrupts_settle(&pointer(event_types::PRESS, EventTarget::Track, 250.0, 1.0)));
        assert!(!strategy.interrupts_settle(&pointer(event_types::PRESS, EventTarget::ArrowDown, 290.0, 1.0)));
        assert!(!strategy.interrupts_settle(&pointer(event_types::MOVE, EventTarget::Document, 130.0, 2.0)));
    }
}
