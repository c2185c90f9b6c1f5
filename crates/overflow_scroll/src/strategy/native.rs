//! Native scroll observation
//!
//! The host scrolls the content itself. These strategies only republish the
//! host's offset into the model so thumb and shadows follow.

use std::sync::Arc;

use overflow_core::events::event_types;
use overflow_core::{EventData, EventTarget, EventType, InputEvent};

use super::{InputStrategy, ScrollRequest, ScrollRequests, ScrollView, StrategyKind};
use crate::config::OverflowConfig;

fn observe(event: &InputEvent) -> ScrollRequests {
    let mut requests = ScrollRequests::new();
    if let EventData::Scroll { offset } = event.data {
        requests.push(ScrollRequest::Observe {
            offset,
            timestamp: event.timestamp,
        });
    }
    requests
}

/// Touch platform with native momentum scrolling
pub struct NativeTouchScroll {
    config: Arc<OverflowConfig>,
}

impl NativeTouchScroll {
    pub fn new(config: Arc<OverflowConfig>) -> Self {
        Self { config }
    }
}

impl InputStrategy for NativeTouchScroll {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NativeTouchScroll
    }

    fn bindings(&self) -> Vec<(EventTarget, EventType)> {
        vec![(EventTarget::Content, event_types::NATIVE_SCROLL)]
    }

    fn handle(&mut self, event: &mut InputEvent, view: &ScrollView<'_>) -> ScrollRequests {
        if event.event_type != event_types::NATIVE_SCROLL {
            return ScrollRequests::new();
        }
        if view
            .clock
            .within_debounce(event.timestamp, self.config.native_scroll_debounce_ms)
        {
            tracing::trace!("native scroll at {} debounced", event.timestamp);
            let mut requests = ScrollRequests::new();
            requests.push(ScrollRequest::Reconcile {
                timestamp: event.timestamp,
            });
            return requests;
        }
        observe(event)
    }
}

/// No custom input handling; native scrolls are still followed so edge
/// shadows stay correct
pub struct PassiveObserver;

impl InputStrategy for PassiveObserver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::None
    }

    fn bindings(&self) -> Vec<(EventTarget, EventType)> {
        vec![(EventTarget::Content, event_types::NATIVE_SCROLL)]
    }

    fn handle(&mut self, event: &mut InputEvent, _view: &ScrollView<'_>) -> ScrollRequests {
        if event.event_type != event_types::NATIVE_SCROLL {
            return ScrollRequests::new();
        }
        observe(event)
    }
}
