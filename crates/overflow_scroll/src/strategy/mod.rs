//! Input strategies
//!
//! One strategy is chosen per controller from the platform's capabilities.
//! A strategy turns raw input into [`ScrollRequest`]s; it never touches the
//! model or the host itself. The controller admits, clamps and applies every
//! request.

mod mouse;
mod native;
mod touch;

use std::fmt;
use std::sync::Arc;

use overflow_core::{EventTarget, EventType, InputEvent};
use overflow_platform::Capabilities;
use smallvec::SmallVec;

use crate::clock::ScrollClock;
use crate::config::OverflowConfig;
use crate::geometry::Geometry;

pub use mouse::{DragState, MouseThumbDrag};
pub use native::{NativeTouchScroll, PassiveObserver};
pub use touch::{EmulatedTouchScroll, TouchState};

/// Which input strategy drives a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Mouse platform, custom thumb dragged with the pointer
    MouseThumbDrag,
    /// Touch platform that scrolls natively; the model only follows
    NativeTouchScroll,
    /// Touch platform without native momentum; touches are translated
    EmulatedTouchScroll,
    /// No custom input handling
    None,
}

impl StrategyKind {
    /// Human readable description, for diagnostics
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::MouseThumbDrag => "no-touch, mouse scroll",
            StrategyKind::NativeTouchScroll => "touch, native scroll + onscroll events",
            StrategyKind::EmulatedTouchScroll => "touch, touch scroll",
            StrategyKind::None => "none",
        }
    }

    /// Whether the host should keep scrolling the content natively
    pub fn uses_native_scrolling(&self) -> bool {
        !matches!(self, StrategyKind::MouseThumbDrag)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Pick the strategy for a platform
pub fn select_strategy(capabilities: &Capabilities, config: &OverflowConfig) -> StrategyKind {
    if !capabilities.touch_input && !capabilities.unreliable_probe {
        if config.has_thumb && config.user_can_drag_thumb {
            StrategyKind::MouseThumbDrag
        } else {
            StrategyKind::None
        }
    } else if capabilities.native_momentum || capabilities.unreliable_probe {
        StrategyKind::NativeTouchScroll
    } else {
        StrategyKind::EmulatedTouchScroll
    }
}

/// What a strategy asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollRequest {
    /// Set the offset directly
    Write { offset: f32, timestamp: f64 },
    /// Set the offset and let the host animate there
    Settle { offset: f32, timestamp: f64 },
    /// Adopt an offset the host already scrolled to
    Observe { offset: f32, timestamp: f64 },
    /// Cancel the host's in-flight transition
    StopAnimation,
    /// Re-read the host offset on the next visual pass
    Reconcile { timestamp: f64 },
}

pub type ScrollRequests = SmallVec<[ScrollRequest; 2]>;

/// Read-only view of the model handed to strategies
#[derive(Debug, Clone, Copy)]
pub struct ScrollView<'a> {
    pub geometry: &'a Geometry,
    pub clock: &'a ScrollClock,
    /// Page coordinate of the viewport's top edge
    pub viewport_origin: f32,
}

impl ScrollView<'_> {
    pub fn offset(&self) -> f32 {
        self.geometry.metrics.scroll_offset()
    }

    /// Page coordinate where the thumb's travel starts
    pub fn track_origin(&self) -> f32 {
        self.viewport_origin + self.geometry.endpoint_inset
    }
}

/// Translates input events into scroll requests
pub trait InputStrategy: Send {
    fn kind(&self) -> StrategyKind;

    /// `(target, event type)` pairs this strategy listens to
    fn bindings(&self) -> Vec<(EventTarget, EventType)>;

    /// Whether `event` takes over from a running settle. If so, the host is
    /// stopped and the model resynced before [`handle`](Self::handle) sees it.
    fn interrupts_settle(&self, _event: &InputEvent) -> bool {
        false
    }

    fn handle(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests;
}

/// Build the strategy for `kind`
pub fn create_strategy(kind: StrategyKind, config: Arc<OverflowConfig>) -> Box<dyn InputStrategy> {
    match kind {
        StrategyKind::MouseThumbDrag => Box::new(MouseThumbDrag::new(config)),
        StrategyKind::NativeTouchScroll => Box::new(NativeTouchScroll::new(config)),
        StrategyKind::EmulatedTouchScroll => Box::new(EmulatedTouchScroll::new(config)),
        StrategyKind::None => Box::new(PassiveObserver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_order() {
        let config = OverflowConfig::default();
        assert_eq!(select_strategy(&Capabilities::MOUSE, &config), StrategyKind::MouseThumbDrag);
        assert_eq!(
            select_strategy(&Capabilities::NATIVE_TOUCH, &config),
            StrategyKind::NativeTouchScroll
        );
        assert_eq!(
            select_strategy(&Capabilities::EMULATED_TOUCH, &config),
            StrategyKind::EmulatedTouchScroll
        );
    }

    #[test]
    fn test_mouse_without_draggable_thumb_is_none() {
        assert_eq!(
            select_strategy(&Capabilities::MOUSE, &OverflowConfig::shadows_only()),
            StrategyKind::None
        );

        let config = OverflowConfig {
            user_can_drag_thumb: false,
            ..Default::default()
        };
        assert_eq!(select_strategy(&Capabilities::MOUSE, &config), StrategyKind::None);
    }

    #[test]
    fn test_unreliable_probe_routes_to_native() {
        let config = OverflowConfig::default();
        let quirky_mouse = Capabilities {
            unreliable_probe: true,
            ..Capabilities::MOUSE
        };
        assert_eq!(select_strategy(&quirky_mouse, &config), StrategyKind::NativeTouchScroll);

        let quirky_touch = Capabilities {
            unreliable_probe: true,
            ..Capabilities::EMULATED_TOUCH
        };
        assert_eq!(select_strategy(&quirky_touch, &config), StrategyKind::NativeTouchScroll);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(StrategyKind::MouseThumbDrag.to_string(), "no-touch, mouse scroll");
        assert_eq!(
            StrategyKind::NativeTouchScroll.description(),
            "touch, native scroll + onscroll events"
        );
        assert_eq!(StrategyKind::EmulatedTouchScroll.description(), "touch, touch scroll");
        assert_eq!(StrategyKind::None.description(), "none");
    }

    #[test]
    fn test_created_strategy_kind_matches() {
        let config = Arc::new(OverflowConfig::default());
        for kind in [
            StrategyKind::MouseThumbDrag,
            StrategyKind::NativeTouchScroll,
            StrategyKind::EmulatedTouchScroll,
            StrategyKind::None,
        ] {
            assert_eq!(create_strategy(kind, Arc::clone(&config)).kind(), kind);
        }
    }
}
