//! Host surface capability
//!
//! The controller never touches a concrete rendering API. Everything it
//! needs from the host (measurements, native scroll position, animated
//! transitions, affordance elements, input subscription) goes through
//! [`Surface`].

use overflow_animation::Easing;
use overflow_core::{Binding, EventHandler, ListenerId};

/// Visual affordances the controller may request from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffordanceKind {
    Thumb,
    Track,
    ShadowTop,
    ShadowBottom,
    ArrowUp,
    ArrowDown,
}

impl AffordanceKind {
    pub const ALL: [AffordanceKind; 6] = [
        AffordanceKind::Track,
        AffordanceKind::Thumb,
        AffordanceKind::ArrowUp,
        AffordanceKind::ArrowDown,
        AffordanceKind::ShadowTop,
        AffordanceKind::ShadowBottom,
    ];
}

/// Opaque handle to an affordance element owned by the host
pub trait Affordance: Send {
    fn show(&mut self);
    fn hide(&mut self);
    /// Offset along the track, in pixels
    fn set_position(&mut self, px: f32);
    /// Length along the track, in pixels
    fn set_length(&mut self, px: f32);
    /// Detach the element from the host
    fn remove(&mut self);
}

/// Whether the host scrolls the content natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NativeScrolling {
    /// Content is clipped, the controller drives the offset
    #[default]
    Suppressed,
    /// Content scrolls natively (touch platforms)
    Enabled,
}

/// A resolved viewport + content pair on the host
///
/// Implementations must not dispatch input events synchronously from inside
/// any of these calls; listeners run with the caller's state locked.
pub trait Surface: Send + Sync {
    /// Visible height of the scrolling region
    fn viewport_visible_extent(&self) -> f32;
    /// Total height of the scrollable content
    fn content_total_extent(&self) -> f32;
    /// Page coordinate of the viewport's top edge
    fn viewport_origin(&self) -> f32;

    fn current_native_scroll_offset(&self) -> f32;
    fn set_native_scroll_offset(&self, offset: f32);

    /// Start an animated transition to `offset`, replacing any running one
    fn animate_scroll_to(&self, offset: f32, duration_ms: f32, easing: Easing);
    /// Stop the running transition where it is
    fn stop_animation(&self);

    fn set_native_scrolling(&self, mode: NativeScrolling);

    /// Create an affordance element; `None` if the host cannot provide one
    fn create_affordance(&self, kind: AffordanceKind) -> Option<Box<dyn Affordance>>;

    fn subscribe(&self, binding: Binding, handler: EventHandler) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId) -> bool;
    /// Remove every listener registered under `namespace`
    fn unsubscribe_namespace(&self, namespace: &str) -> usize;
}
