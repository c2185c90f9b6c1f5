//! Headless host
//!
//! An in-memory implementation of the host capabilities. Measurements are
//! set directly, input is injected with [`HeadlessSurface::emit`] and
//! friends, animated transitions advance with [`HeadlessSurface::advance`],
//! and every affordance the controller creates can be inspected.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use overflow_animation::{Easing, Tween};
use overflow_core::events::event_types;
use overflow_core::{Binding, EventDispatcher, EventHandler, EventTarget, InputEvent, ListenerId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::capability::{Capabilities, CapabilityProbe, ViewLayer};
use crate::error::{Result, SurfaceError};
use crate::surface::{Affordance, AffordanceKind, NativeScrolling, Surface};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observable state of one affordance element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffordanceRecord {
    pub visible: bool,
    pub position: f32,
    pub length: f32,
    pub removed: bool,
    /// Number of show/hide calls, to detect redundant visual churn
    pub visibility_changes: u32,
}

#[derive(Default)]
struct HeadlessState {
    viewport_extent: f32,
    content_extent: f32,
    origin: f32,
    offset: f32,
    native_scrolling: NativeScrolling,
    animation: Option<Tween>,
    animations_started: u32,
    animations_stopped: u32,
    affordances: FxHashMap<AffordanceKind, AffordanceRecord>,
    refused: FxHashSet<AffordanceKind>,
}

impl HeadlessState {
    fn max_offset(&self) -> f32 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    fn clamp(&self, offset: f32) -> f32 {
        if offset.is_finite() {
            offset.clamp(0.0, self.max_offset())
        } else {
            0.0
        }
    }
}

/// In-memory viewport + content pair
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
    dispatcher: Mutex<EventDispatcher>,
}

impl HeadlessSurface {
    pub fn new(viewport_extent: f32, content_extent: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                viewport_extent,
                content_extent,
                ..Default::default()
            })),
            dispatcher: Mutex::new(EventDispatcher::new()),
        }
    }

    /// Place the viewport's top edge at page coordinate `origin`
    pub fn with_origin(self, origin: f32) -> Self {
        lock(&self.state).origin = origin;
        self
    }

    /// Make `create_affordance` return `None` for `kind`
    pub fn refuse_affordance(self, kind: AffordanceKind) -> Self {
        lock(&self.state).refused.insert(kind);
        self
    }

    pub fn set_viewport_extent(&self, extent: f32) {
        let mut state = lock(&self.state);
        state.viewport_extent = extent;
        state.offset = state.clamp(state.offset);
    }

    pub fn set_content_extent(&self, extent: f32) {
        let mut state = lock(&self.state);
        state.content_extent = extent;
        state.offset = state.clamp(state.offset);
    }

    // =========================================================================
    // Input injection
    // =========================================================================

    /// Dispatch an event to every matching listener and return it, so callers
    /// can inspect `default_prevented`
    pub fn emit(&self, mut event: InputEvent) -> InputEvent {
        // Release the dispatcher before running handlers; they may unsubscribe
        let handlers = lock(&self.dispatcher).handlers_for(event.target, event.event_type);
        tracing::trace!(
            "headless: event {} on {:?} at {} -> {} handlers",
            event.event_type,
            event.target,
            event.timestamp,
            handlers.len()
        );
        for handler in handlers {
            handler(&mut event);
        }
        event
    }

    pub fn press(&self, target: EventTarget, y: f32, timestamp: f64) -> InputEvent {
        self.emit(InputEvent::pointer(event_types::PRESS, target, y, timestamp))
    }

    /// Mouse move, delivered at document level
    pub fn move_pointer(&self, y: f32, timestamp: f64) -> InputEvent {
        self.emit(InputEvent::pointer(
            event_types::MOVE,
            EventTarget::Document,
            y,
            timestamp,
        ))
    }

    /// Mouse release, delivered at document level
    pub fn release(&self, y: f32, timestamp: f64) -> InputEvent {
        self.emit(InputEvent::pointer(
            event_types::RELEASE,
            EventTarget::Document,
            y,
            timestamp,
        ))
    }

    pub fn touch_start(&self, page_y: f32, timestamp: f64) -> InputEvent {
        self.emit(InputEvent::touch(event_types::TOUCH_START, page_y, timestamp))
    }

    pub fn touch_move(&self, page_y: f32, timestamp: f64) -> InputEvent {
        self.emit(InputEvent::touch(event_types::TOUCH_MOVE, page_y, timestamp))
    }

    pub fn touch_end(&self, page_y: f32, timestamp: f64) -> InputEvent {
        self.emit(InputEvent::touch(event_types::TOUCH_END, page_y, timestamp))
    }

    /// Scroll natively (as a momentum fling would) and notify listeners
    pub fn native_scroll_to(&self, offset: f32, timestamp: f64) -> InputEvent {
        let offset = {
            let mut state = lock(&self.state);
            state.offset = state.clamp(offset);
            state.offset
        };
        self.emit(InputEvent::native_scroll(offset, timestamp))
    }

    /// Change the content height and notify mutation listeners
    pub fn mutate_content(&self, content_extent: f32, timestamp: f64) -> InputEvent {
        self.set_content_extent(content_extent);
        self.emit(InputEvent::content_mutated(timestamp))
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance the running transition by `dt_ms`. Returns true while animating.
    pub fn advance(&self, dt_ms: f32) -> bool {
        let mut state = lock(&self.state);
        let Some(mut tween) = state.animation.take() else {
            return false;
        };
        let value = tween.step(dt_ms);
        state.offset = state.clamp(value);
        if tween.is_finished() {
            false
        } else {
            state.animation = Some(tween);
            true
        }
    }

    /// Run the current transition to completion
    pub fn finish_animation(&self) {
        while self.advance(16.0) {}
    }

    pub fn is_animating(&self) -> bool {
        lock(&self.state).animation.is_some()
    }

    pub fn animation_target(&self) -> Option<f32> {
        lock(&self.state).animation.map(|t| t.target())
    }

    pub fn animations_started(&self) -> u32 {
        lock(&self.state).animations_started
    }

    pub fn animations_stopped(&self) -> u32 {
        lock(&self.state).animations_stopped
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn affordance(&self, kind: AffordanceKind) -> Option<AffordanceRecord> {
        lock(&self.state).affordances.get(&kind).cloned()
    }

    /// True if the affordance exists, is attached, and is shown
    pub fn is_visible(&self, kind: AffordanceKind) -> bool {
        self.affordance(kind)
            .map(|a| a.visible && !a.removed)
            .unwrap_or(false)
    }

    pub fn native_scrolling(&self) -> NativeScrolling {
        lock(&self.state).native_scrolling
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.dispatcher).len()
    }

    pub fn namespace_listener_count(&self, namespace: &str) -> usize {
        lock(&self.dispatcher).namespace_len(namespace)
    }
}

impl Surface for HeadlessSurface {
    fn viewport_visible_extent(&self) -> f32 {
        lock(&self.state).viewport_extent
    }

    fn content_total_extent(&self) -> f32 {
        lock(&self.state).content_extent
    }

    fn viewport_origin(&self) -> f32 {
        lock(&self.state).origin
    }

    fn current_native_scroll_offset(&self) -> f32 {
        lock(&self.state).offset
    }

    fn set_native_scroll_offset(&self, offset: f32) {
        let mut state = lock(&self.state);
        state.offset = state.clamp(offset);
    }

    fn animate_scroll_to(&self, offset: f32, duration_ms: f32, easing: Easing) {
        let mut state = lock(&self.state);
        let target = state.clamp(offset);
        state.animation = Some(Tween::new(state.offset, target, duration_ms, easing));
        state.animations_started += 1;
    }

    fn stop_animation(&self) {
        let mut state = lock(&self.state);
        if state.animation.take().is_some() {
            state.animations_stopped += 1;
        }
    }

    fn set_native_scrolling(&self, mode: NativeScrolling) {
        lock(&self.state).native_scrolling = mode;
    }

    fn create_affordance(&self, kind: AffordanceKind) -> Option<Box<dyn Affordance>> {
        let mut state = lock(&self.state);
        if state.refused.contains(&kind) {
            tracing::debug!("headless: refusing {:?} affordance", kind);
            return None;
        }
        state.affordances.insert(kind, AffordanceRecord::default());
        Some(Box::new(HeadlessAffordance {
            kind,
            state: Arc::clone(&self.state),
        }))
    }

    fn subscribe(&self, binding: Binding, handler: EventHandler) -> ListenerId {
        lock(&self.dispatcher).register(binding, handler)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        lock(&self.dispatcher).unregister(id)
    }

    fn unsubscribe_namespace(&self, namespace: &str) -> usize {
        lock(&self.dispatcher).unregister_namespace(namespace)
    }
}

struct HeadlessAffordance {
    kind: AffordanceKind,
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessAffordance {
    fn update(&self, f: impl FnOnce(&mut AffordanceRecord)) {
        let mut state = lock(&self.state);
        if let Some(record) = state.affordances.get_mut(&self.kind) {
            f(record);
        }
    }
}

impl Affordance for HeadlessAffordance {
    fn show(&mut self) {
        self.update(|r| {
            r.visible = true;
            r.visibility_changes += 1;
        });
    }

    fn hide(&mut self) {
        self.update(|r| {
            r.visible = false;
            r.visibility_changes += 1;
        });
    }

    fn set_position(&mut self, px: f32) {
        self.update(|r| r.position = px);
    }

    fn set_length(&mut self, px: f32) {
        self.update(|r| r.length = px);
    }

    fn remove(&mut self) {
        self.update(|r| {
            r.removed = true;
            r.visible = false;
        });
    }
}

/// Headless view layer: a selector registry plus fixed capabilities
pub struct HeadlessPlatform {
    capabilities: Capabilities,
    /// viewport selector -> (content selector, surface)
    surfaces: FxHashMap<String, (String, Arc<HeadlessSurface>)>,
}

impl HeadlessPlatform {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            surfaces: FxHashMap::default(),
        }
    }

    /// Make `surface` resolvable by the selector pair
    pub fn register(
        &mut self,
        viewport: impl Into<String>,
        content: impl Into<String>,
        surface: Arc<HeadlessSurface>,
    ) {
        self.surfaces
            .insert(viewport.into(), (content.into(), surface));
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl CapabilityProbe for HeadlessPlatform {
    fn supports_touch_input(&self) -> bool {
        self.capabilities.touch_input
    }

    fn supports_native_momentum_scroll(&self) -> bool {
        self.capabilities.native_momentum
    }

    fn is_known_unreliable_platform(&self) -> bool {
        self.capabilities.unreliable_probe
    }
}

impl ViewLayer for HeadlessPlatform {
    fn resolve(&self, viewport: &str, content: &str) -> Result<Arc<dyn Surface>> {
        let Some((content_selector, surface)) = self.surfaces.get(viewport) else {
            return Err(SurfaceError::ViewportUnresolved(viewport.to_string()));
        };
        if content_selector != content {
            return Err(SurfaceError::ContentUnresolved(content.to_string()));
        }
        let surface: Arc<dyn Surface> = surface.clone();
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_offset_is_clamped_like_a_browser() {
        let surface = HeadlessSurface::new(200.0, 1000.0);
        surface.set_native_scroll_offset(-20.0);
        assert_eq!(surface.current_native_scroll_offset(), 0.0);
        surface.set_native_scroll_offset(5000.0);
        assert_eq!(surface.current_native_scroll_offset(), 800.0);

        // Shrinking the content pulls the offset back in range
        surface.set_content_extent(500.0);
        assert_eq!(surface.current_native_scroll_offset(), 300.0);
    }

    #[test]
    fn test_animation_advances_and_stops() {
        let surface = HeadlessSurface::new(200.0, 1000.0);
        surface.animate_scroll_to(100.0, 200.0, Easing::Linear);
        assert!(surface.is_animating());
        assert_eq!(surface.animation_target(), Some(100.0));

        assert!(surface.advance(100.0));
        assert!((surface.current_native_scroll_offset() - 50.0).abs() < 1e-3);

        surface.stop_animation();
        assert!(!surface.is_animating());
        assert_eq!(surface.animations_stopped(), 1);
        assert!(!surface.advance(100.0));
        assert!((surface.current_native_scroll_offset() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_refused_affordance_is_none() {
        let surface = HeadlessSurface::new(200.0, 1000.0).refuse_affordance(AffordanceKind::Thumb);
        assert!(surface.create_affordance(AffordanceKind::Thumb).is_none());
        assert!(surface.create_affordance(AffordanceKind::Track).is_some());
    }

    #[test]
    fn test_affordance_records_calls() {
        let surface = HeadlessSurface::new(200.0, 1000.0);
        let mut thumb = surface
            .create_affordance(AffordanceKind::Thumb)
            .expect("thumb");
        thumb.show();
        thumb.set_length(40.0);
        thumb.set_position(12.0);

        let record = surface.affordance(AffordanceKind::Thumb).unwrap();
        assert!(record.visible);
        assert_eq!(record.length, 40.0);
        assert_eq!(record.position, 12.0);

        thumb.remove();
        assert!(!surface.is_visible(AffordanceKind::Thumb));
    }

    #[test]
    fn test_platform_resolution_errors() {
        let mut platform = HeadlessPlatform::new(Capabilities::MOUSE);
        platform.register("#viewport", "#content", Arc::new(HeadlessSurface::new(1.0, 1.0)));

        assert!(platform.resolve("#viewport", "#content").is_ok());
        assert_eq!(
            platform.resolve("#missing", "#content").err(),
            Some(SurfaceError::ViewportUnresolved("#missing".into()))
        );
        assert_eq!(
            platform.resolve("#viewport", "#other").err(),
            Some(SurfaceError::ContentUnresolved("#other".into()))
        );
    }
}
