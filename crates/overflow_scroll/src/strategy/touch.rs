//! Emulated touch scrolling
//!
//! For touch platforms without native momentum. The content follows the
//! finger while it moves; on release the last sample-to-sample speed is
//! extrapolated linearly and the host animates to the result.

use std::sync::Arc;

use overflow_core::events::event_types;
use overflow_core::{EventTarget, EventType, InputEvent, StateTransitions};

use super::{InputStrategy, ScrollRequest, ScrollRequests, ScrollView, StrategyKind};
use crate::config::OverflowConfig;

/// Touch gesture tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchState {
    #[default]
    Idle,
    Tracking,
}

impl StateTransitions for TouchState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        match (self, event) {
            (TouchState::Idle, event_types::TOUCH_START) => Some(TouchState::Tracking),
            (TouchState::Tracking, event_types::TOUCH_END) => Some(TouchState::Idle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Gesture {
    anchor_offset: f32,
    start_sample: f32,
    previous_sample: f32,
    speed: f32,
    started_at: f64,
}

pub struct EmulatedTouchScroll {
    config: Arc<OverflowConfig>,
    state: TouchState,
    gesture: Gesture,
}

impl EmulatedTouchScroll {
    pub fn new(config: Arc<OverflowConfig>) -> Self {
        Self {
            config,
            state: TouchState::Idle,
            gesture: Gesture::default(),
        }
    }

    pub fn state(&self) -> TouchState {
        self.state
    }

    /// Last sample-to-sample movement of the finger
    pub fn speed(&self) -> f32 {
        self.gesture.speed
    }

    fn start(&mut self, event: &InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        let Some(sample) = event.position() else {
            return ScrollRequests::new();
        };
        // A second start without an end re-anchors the gesture
        self.state.send(event_types::TOUCH_START);
        self.gesture = Gesture {
            anchor_offset: view.offset(),
            start_sample: sample,
            previous_sample: sample,
            speed: 0.0,
            started_at: event.timestamp,
        };

        let mut requests = ScrollRequests::new();
        requests.push(ScrollRequest::StopAnimation);
        requests
    }

    fn track(&mut self, event: &mut InputEvent) -> ScrollRequests {
        let mut requests = ScrollRequests::new();
        if self.state != TouchState::Tracking {
            return requests;
        }
        let Some(sample) = event.position() else {
            return requests;
        };

        let gesture = &mut self.gesture;
        gesture.speed = sample - gesture.previous_sample;
        gesture.previous_sample = sample;
        event.prevent_default();

        requests.push(ScrollRequest::Write {
            offset: gesture.anchor_offset - (sample - gesture.start_sample),
            timestamp: event.timestamp,
        });
        requests
    }

    fn end(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        let mut requests = ScrollRequests::new();
        if !self.state.send(event_types::TOUCH_END) {
            return requests;
        }

        let elapsed = event.timestamp - self.gesture.started_at;
        if elapsed <= self.config.tap_max_duration_ms {
            tracing::trace!("touch gesture of {}ms treated as tap", elapsed);
            requests.push(ScrollRequest::Write {
                offset: self.gesture.anchor_offset,
                timestamp: event.timestamp,
            });
            return requests;
        }

        let target = view.offset() - self.gesture.speed * self.config.inertia_factor;
        tracing::trace!(
            "touch settle: speed={} target={}",
            self.gesture.speed,
            target
        );
        event.prevent_default();
        requests.push(ScrollRequest::StopAnimation);
        requests.push(ScrollRequest::Settle {
            offset: target,
            timestamp: event.timestamp,
        });
        requests
    }
}

impl InputStrategy for EmulatedTouchScroll {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EmulatedTouchScroll
    }

    fn bindings(&self) -> Vec<(EventTarget, EventType)> {
        vec![
            (EventTarget::Content, event_types::TOUCH_START),
            (EventTarget::Content, event_types::TOUCH_MOVE),
            (EventTarget::Content, event_types::TOUCH_END),
        ]
    }

    fn interrupts_settle(&self, event: &InputEvent) -> bool {
        event.event_type == event_types::TOUCH_START
    }

    fn handle(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        match event.event_type {
            event_types::TOUCH_START => self.start(event, view),
            event_types::TOUCH_MOVE => self.track(event),
            event_types::TOUCH_END => self.end(event, view),
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
        GeometryModel::default().compute(200.0, 1000.0, offset)
    }

    fn handle(strategy: &mut EmulatedTouchScroll, event: &mut InputEvent, offset: f32) -> ScrollRequests {
        let g = geometry(offset);
        let clock = ScrollClock::new();
        let view = ScrollView {
            geometry: &g,
            clock: &clock,
            viewport_origin: 0.0,
        };
        strategy.handle(event, &view)
    }

    #[test]
    fn test_move_follows_finger() {
        let mut strategy = EmulatedTouchScroll::new(Arc::new(OverflowConfig::default()));

        let mut start = InputEvent::touch(event_types::TOUCH_START, 300.0, 0.0);
        assert_eq!(
            handle(&mut strategy, &mut start, 100.0).as_slice(),
            &[ScrollRequest::StopAnimation]
        );
        assert_eq!(strategy.state(), TouchState::Tracking);

        let mut mv = InputEvent::touch(event_types::TOUCH_MOVE, 280.0, 16.0);
        assert_eq!(
            handle(&mut strategy, &mut mv, 100.0).as_slice(),
            &[ScrollRequest::Write { offset: 120.0, timestamp: 16.0 }]
        );
        assert!(mv.default_prevented);
        assert_eq!(strategy.speed(), -20.0);

        let mut mv = InputEvent::touch(event_types::TOUCH_MOVE, 250.0, 32.0);
        assert_eq!(
            handle(&mut strategy, &mut mv, 120.0).as_slice(),
            &[ScrollRequest::Write { offset: 150.0, timestamp: 32.0 }]
        );
        assert_eq!(strategy.speed(), -30.0);
    }

    #[test]
    fn test_release_settles_with_inertia() {
        let mut strategy = EmulatedTouchScroll::new(Arc::new(OverflowConfig::default()));

        handle(&mut strategy, &mut InputEvent::touch(event_types::TOUCH_START, 100.0, 0.0), 110.0);
        handle(&mut strategy, &mut InputEvent::touch(event_types::TOUCH_MOVE, 110.0, 100.0), 110.0);
        assert_eq!(strategy.speed(), 10.0);

        let mut end = InputEvent::touch(event_types::TOUCH_END, 110.0, 300.0);
        let requests = handle(&mut strategy, &mut end, 100.0);
        assert_eq!(
            requests.as_slice(),
            &[
                ScrollRequest::StopAnimation,
                ScrollRequest::Settle { offset: 70.0, timestamp: 300.0 },
            ]
        );
        assert_eq!(strategy.state(), TouchState::Idle);
    }

    #[test]
    fn test_short_gesture_is_tap() {
        let mut strategy = EmulatedTouchScroll::new(Arc::new(OverflowConfig::default()));

        handle(&mut strategy, &mut InputEvent::touch(event_types::TOUCH_START, 100.0, 1000.0), 50.0);
        handle(&mut strategy, &mut InputEvent::touch(event_types::TOUCH_MOVE, 90.0, 1050.0), 50.0);

        let mut end = InputEvent::touch(event_types::TOUCH_END, 90.0, 1150.0);
        assert_eq!(
            handle(&mut strategy, &mut end, 60.0).as_slice(),
            &[ScrollRequest::Write { offset: 50.0, timestamp: 1150.0 }]
        );
        assert!(!end.default_prevented);
    }

    #[test]
    fn test_events_without_start_are_ignored() {
        let mut strategy = EmulatedTouchScroll::new(Arc::new(OverflowConfig::default()));
        let mut mv = InputEvent::touch(event_types::TOUCH_MOVE, 90.0, 1.0);
        assert!(handle(&mut strategy, &mut mv, 0.0).is_empty());
        let mut end = InputEvent::touch(event_types::TOUCH_END, 90.0, 2.0);
        assert!(handle(&mut strategy, &mut end, 0.0).is_empty());
    }

    #[test]
    fn test_touch_start_interrupts_settle() {
        let strategy = EmulatedTouchScroll::new(Arc::new(OverflowConfig::default()));
        assert!(strategy.interrupts_settle(&InputEvent::touch(event_types::TOUCH_START, 300.0, 0.0)));
        assert!(!strategy.interrupts_settle(&InputEvent::touch(event_types::TOUCH_MOVE, 290.0, 16.0)));
        assert!(!strategy.interrupts_settle(&InputEvent::touch(event_types::TOUCH_END, 290.0, 32.0)));
    }
}
