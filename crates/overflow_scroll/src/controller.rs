//! Overflow controller
//!
//! Owns the scroll model for one viewport + content pair. Input reaches the
//! active [`InputStrategy`] through listeners registered on the surface;
//! the resulting requests are admitted by the [`ScrollClock`], clamped,
//! written, and rendered by a deferred visual pass on the next scheduler
//! turn. Bursts of input coalesce into a single pass.
//!
//! State is shared as `Arc<Mutex<_>>`. Listeners and deferred tasks hold a
//! `Weak` so a dropped controller is never kept alive by the host.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use overflow_animation::TurnScheduler;
use overflow_core::events::event_types;
use overflow_core::{
    Binding, EventHandler, EventTarget, EventType, InputEvent, ListenerId, StateTransitions,
};
use overflow_platform::{
    Affordance, AffordanceKind, Capabilities, NativeScrolling, Surface, ViewLayer,
};
use smallvec::SmallVec;

use crate::clock::ScrollClock;
use crate::config::OverflowConfig;
use crate::edge::{EdgeState, EdgeStateTracker, EdgeTransition, ShadowVisibility};
use crate::geometry::{Geometry, GeometryModel, ScrollMetrics, ThumbGeometry};
use crate::strategy::{
    create_strategy, select_strategy, InputStrategy, ScrollRequest, ScrollView, StrategyKind,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique controller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u64);

impl ControllerId {
    fn next() -> Self {
        Self(NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Namespace under which this controller's listeners are registered
    pub fn namespace(&self) -> String {
        format!("overflow.{}", self.0)
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Ready,
    /// Terminal
    Destroyed,
}

impl StateTransitions for Lifecycle {
    fn on_event(&self, event: EventType) -> Option<Self> {
        match (self, event) {
            (Lifecycle::Uninitialized, event_types::MOUNT) => Some(Lifecycle::Ready),
            (Lifecycle::Ready, event_types::UNMOUNT) => Some(Lifecycle::Destroyed),
            _ => None,
        }
    }
}

/// Called with the metrics after a visual pass that moved the position
pub type ScrollObserver = Arc<dyn Fn(&ScrollMetrics) + Send + Sync>;

/// Called for each edge transition
pub type EdgeObserver = Arc<dyn Fn(EdgeTransition) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Set the host offset immediately
    Direct,
    /// Ask the host to animate to the offset
    Animated,
    /// The host is already there
    Observed,
}

struct AffordanceSlot {
    kind: AffordanceKind,
    handle: Box<dyn Affordance>,
    visible: Option<bool>,
}

impl AffordanceSlot {
    fn set_visible(&mut self, visible: bool, force: bool) {
        if !force && self.visible == Some(visible) {
            return;
        }
        if visible {
            self.handle.show();
        } else {
            self.handle.hide();
        }
        self.visible = Some(visible);
    }
}

/// Observer work collected under the lock and delivered after it is released
#[derive(Default)]
struct Notifications {
    scrolled: Option<ScrollMetrics>,
    transitions: SmallVec<[EdgeTransition; 3]>,
}

struct ControllerInner {
    id: ControllerId,
    namespace: String,
    config: Arc<OverflowConfig>,
    surface: Arc<dyn Surface>,
    scheduler: Arc<dyn TurnScheduler>,
    model: GeometryModel,
    geometry: Geometry,
    clock: ScrollClock,
    edges: EdgeStateTracker,
    kind: StrategyKind,
    strategy: Box<dyn InputStrategy>,
    affordances: SmallVec<[AffordanceSlot; 6]>,
    listeners: Vec<ListenerId>,
    lifecycle: Lifecycle,
    pass_pending: bool,
    /// Target of a settle the host is still animating toward
    settle_target: Option<f32>,
    /// Timestamp of the newest debounced host scroll, re-read on the next pass
    reconcile_at: Option<f64>,
    /// Offset at the last visual pass
    rendered_offset: f32,
    scroll_observers: Vec<ScrollObserver>,
    edge_observers: Vec<EdgeObserver>,
    this: Weak<Mutex<ControllerInner>>,
}

fn run_locked<R>(
    inner: &Mutex<ControllerInner>,
    f: impl FnOnce(&mut ControllerInner, &mut Notifications) -> R,
) -> R {
    let mut notes = Notifications::default();
    let (result, scroll_observers, edge_observers) = {
        let mut guard = lock(inner);
        let result = f(&mut guard, &mut notes);
        let scroll_observers = if notes.scrolled.is_some() {
            guard.scroll_observers.clone()
        } else {
            Vec::new()
        };
        let edge_observers = if notes.transitions.is_empty() {
            Vec::new()
        } else {
            guard.edge_observers.clone()
        };
        (result, scroll_observers, edge_observers)
    };

    if let Some(metrics) = notes.scrolled {
        for observer in &scroll_observers {
            observer(&metrics);
        }
    }
    for transition in notes.transitions {
        for observer in &edge_observers {
            observer(transition);
        }
    }
    result
}

impl ControllerInner {
    fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    fn slot_mut(&mut self, kind: AffordanceKind) -> Option<&mut AffordanceSlot> {
        self.affordances.iter_mut().find(|slot| slot.kind == kind)
    }

    fn measure(&self, previous_offset: f32) -> Geometry {
        self.model.compute(
            self.surface.viewport_visible_extent(),
            self.surface.content_total_extent(),
            previous_offset,
        )
    }

    /// The host scrolls by itself and the model only follows
    fn follows_host(&self) -> bool {
        matches!(
            self.kind,
            StrategyKind::NativeTouchScroll | StrategyKind::None
        )
    }

    fn mount(&mut self) {
        let mode = if self.kind.uses_native_scrolling() {
            NativeScrolling::Enabled
        } else {
            NativeScrolling::Suppressed
        };
        self.surface.set_native_scrolling(mode);

        self.geometry = self.measure(self.surface.current_native_scroll_offset());
        self.rendered_offset = self.geometry.metrics.scroll_offset();

        self.create_affordances();
        self.apply_layout();
        let update = self.edges.update(&self.geometry.metrics);
        self.apply_visibility(&update.new_state, true);
        self.render_position();

        self.bind_listeners();
        self.lifecycle.send(event_types::MOUNT);

        tracing::debug!(
            "overflow controller {} ready: {} (viewport={}, content={})",
            self.id,
            self.kind.description(),
            self.geometry.metrics.viewport_extent(),
            self.geometry.metrics.content_extent()
        );
    }

    fn create_affordances(&mut self) {
        let config = Arc::clone(&self.config);
        let wanted = AffordanceKind::ALL.into_iter().filter(|kind| match kind {
            AffordanceKind::Thumb => config.has_thumb,
            AffordanceKind::Track => config.track_enabled(),
            AffordanceKind::ArrowUp | AffordanceKind::ArrowDown => config.arrows_enabled(),
            AffordanceKind::ShadowTop | AffordanceKind::ShadowBottom => config.has_edge_shadows,
        });

        for kind in wanted {
            match self.surface.create_affordance(kind) {
                Some(handle) => self.affordances.push(AffordanceSlot {
                    kind,
                    handle,
                    visible: None,
                }),
                None => tracing::debug!("host provided no {:?} affordance", kind),
            }
        }
    }

    fn bind_listeners(&mut self) {
        let mut bindings: Vec<(EventTarget, EventType)> = self.strategy.bindings();
        bindings.push((EventTarget::Content, event_types::CONTENT_MUTATED));

        for (target, event_type) in bindings {
            let weak = self.this.clone();
            let handler: EventHandler = Arc::new(move |event: &mut InputEvent| {
                if let Some(inner) = weak.upgrade() {
                    run_locked(&inner, |inner, notes| inner.handle_event(event, notes));
                }
            });
            let binding = Binding::new(target, event_type).in_namespace(self.namespace.clone());
            self.listeners.push(self.surface.subscribe(binding, handler));
        }
    }

    fn handle_event(&mut self, event: &mut InputEvent, notes: &mut Notifications) {
        if !self.is_ready() {
            return;
        }
        if event.event_type == event_types::CONTENT_MUTATED {
            self.refresh(notes);
            return;
        }

        // Anchors must be taken from where the content actually stopped
        if self.settle_target.is_some() && self.strategy.interrupts_settle(event) {
            self.interrupt_settle(event.timestamp);
        }

        let view = ScrollView {
            geometry: &self.geometry,
            clock: &self.clock,
            viewport_origin: self.surface.viewport_origin(),
        };
        let requests = self.strategy.handle(event, &view);

        for request in requests {
            match request {
                ScrollRequest::StopAnimation => {
                    self.surface.stop_animation();
                    self.settle_target = None;
                }
                ScrollRequest::Write { offset, timestamp } => {
                    self.write(offset, timestamp, WriteMode::Direct);
                }
                ScrollRequest::Settle { offset, timestamp } => {
                    self.write(offset, timestamp, WriteMode::Animated);
                }
                ScrollRequest::Observe { offset, timestamp } => {
                    self.write(offset, timestamp, WriteMode::Observed);
                }
                ScrollRequest::Reconcile { timestamp } => {
                    self.reconcile_at = Some(match self.reconcile_at {
                        Some(pending) => pending.max(timestamp),
                        None => timestamp,
                    });
                    self.schedule_pass();
                }
            }
        }
    }

    /// Stop the host's transition and adopt the offset it stopped at
    fn interrupt_settle(&mut self, timestamp: f64) {
        let Some(target) = self.settle_target.take() else {
            return;
        };
        self.surface.stop_animation();
        let offset = self.surface.current_native_scroll_offset();
        tracing::trace!(
            "controller {}: settle to {} interrupted at {}",
            self.id,
            target,
            offset
        );
        self.write(offset, timestamp, WriteMode::Observed);
    }

    /// Adopt the host offset for a debounced scroll stamped `timestamp`
    fn reconcile(&mut self, timestamp: f64) {
        if !self.clock.admit(timestamp) {
            return;
        }
        let offset = self.surface.current_native_scroll_offset();
        self.geometry = self.geometry.with_offset(offset);
        self.settle_target = None;
        tracing::trace!(
            "controller {}: reconciled to host offset {} at {}",
            self.id,
            offset,
            timestamp
        );
    }

    fn write(&mut self, target: f32, timestamp: f64, mode: WriteMode) -> bool {
        if !self.clock.admit(timestamp) {
            tracing::trace!(
                "controller {}: dropped stale write to {} at {}",
                self.id,
                target,
                timestamp
            );
            return false;
        }

        let previous = self.geometry.metrics.scroll_offset();
        self.geometry = self.geometry.with_offset(target);
        let offset = self.geometry.metrics.scroll_offset();
        tracing::trace!(
            "controller {}: {:?} write {} -> {} at {}",
            self.id,
            mode,
            previous,
            offset,
            timestamp
        );

        match mode {
            WriteMode::Direct => {
                self.surface.set_native_scroll_offset(offset);
                self.settle_target = None;
            }
            WriteMode::Animated => {
                if offset != previous {
                    self.surface.animate_scroll_to(
                        offset,
                        self.config.settle_duration_ms,
                        self.config.settle_easing,
                    );
                    self.settle_target = Some(offset);
                }
            }
            WriteMode::Observed => self.settle_target = None,
        }

        self.schedule_pass();
        true
    }

    fn schedule_pass(&mut self) {
        if self.pass_pending {
            return;
        }
        self.pass_pending = true;

        let weak = self.this.clone();
        self.scheduler.defer(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                run_locked(&inner, |inner, notes| inner.visual_pass(notes));
            }
        }));
    }

    fn visual_pass(&mut self, notes: &mut Notifications) {
        self.pass_pending = false;
        if !self.is_ready() {
            return;
        }
        if let Some(timestamp) = self.reconcile_at.take() {
            self.reconcile(timestamp);
        }
        self.clock.commit();
        self.sync_visuals(false, notes);
        tracing::trace!(
            "controller {}: visual pass at offset {}",
            self.id,
            self.geometry.metrics.scroll_offset()
        );
    }

    fn sync_visuals(&mut self, force: bool, notes: &mut Notifications) {
        let update = self.edges.update(&self.geometry.metrics);
        if force || update.any_changed() {
            self.apply_visibility(&update.new_state, force);
        }
        notes.transitions.extend(update.transitions);

        self.render_position();
        let offset = self.geometry.metrics.scroll_offset();
        if offset != self.rendered_offset {
            self.rendered_offset = offset;
            notes.scrolled = Some(self.geometry.metrics);
        }
    }

    /// Sizes that depend on measurements only
    fn apply_layout(&mut self) {
        let geometry = self.geometry;
        let viewport = geometry.metrics.viewport_extent();
        let arrow = self.config.arrow_extent;
        let reserved = self.config.reserved_endpoint_space();

        for slot in self.affordances.iter_mut() {
            match slot.kind {
                AffordanceKind::Thumb => slot.handle.set_length(geometry.thumb.thumb_length),
                AffordanceKind::Track => {
                    slot.handle.set_position(geometry.endpoint_inset);
                    slot.handle.set_length((viewport - reserved).max(0.0));
                }
                AffordanceKind::ArrowUp => {
                    slot.handle.set_position(0.0);
                    slot.handle.set_length(arrow);
                }
                AffordanceKind::ArrowDown => {
                    slot.handle.set_position((viewport - arrow).max(0.0));
                    slot.handle.set_length(arrow);
                }
                AffordanceKind::ShadowTop | AffordanceKind::ShadowBottom => {}
            }
        }
    }

    fn apply_visibility(&mut self, state: &EdgeState, force: bool) {
        let shadows = ShadowVisibility::from_state(state);
        let scrollbar = state.has_overflow || !self.config.auto_hide_thumb_when_no_overflow;

        for slot in self.affordances.iter_mut() {
            let visible = match slot.kind {
                AffordanceKind::ShadowTop => shadows.top,
                AffordanceKind::ShadowBottom => shadows.bottom,
                AffordanceKind::Thumb
                | AffordanceKind::Track
                | AffordanceKind::ArrowUp
                | AffordanceKind::ArrowDown => scrollbar,
            };
            slot.set_visible(visible, force);
        }
    }

    fn render_position(&mut self) {
        let position = self.geometry.current_thumb_position();
        if let Some(thumb) = self.slot_mut(AffordanceKind::Thumb) {
            thumb.handle.set_position(position);
        }
    }

    fn refresh(&mut self, notes: &mut Notifications) {
        if !self.is_ready() {
            return;
        }
        // The model leads the host while its own settle is running
        let previous = if self.follows_host() && self.settle_target.is_none() {
            self.surface.current_native_scroll_offset()
        } else {
            self.geometry.metrics.scroll_offset()
        };
        self.geometry = self.measure(previous);
        self.apply_layout();
        self.sync_visuals(true, notes);
        self.clock.commit();

        tracing::trace!(
            "controller {}: refreshed (viewport={}, content={}, offset={})",
            self.id,
            self.geometry.metrics.viewport_extent(),
            self.geometry.metrics.content_extent(),
            self.geometry.metrics.scroll_offset()
        );
    }

    fn scroll_to(&mut self, target: f32, timestamp: Option<f64>) {
        if !self.is_ready() {
            return;
        }
        let offset = self.geometry.clamp_offset(target);
        if offset == self.geometry.metrics.scroll_offset() {
            return;
        }
        let timestamp = timestamp
            .or(self.clock.last_update_timestamp())
            .unwrap_or(0.0);
        self.write(offset, timestamp, WriteMode::Animated);
    }

    fn destroy(&mut self) {
        if !self.is_ready() {
            return;
        }
        for id in self.listeners.drain(..) {
            self.surface.unsubscribe(id);
        }
        let swept = self.surface.unsubscribe_namespace(&self.namespace);
        self.surface.stop_animation();
        self.settle_target = None;
        self.reconcile_at = None;
        for mut slot in self.affordances.drain(..) {
            slot.handle.remove();
        }
        self.scroll_observers.clear();
        self.edge_observers.clear();
        self.lifecycle.send(event_types::UNMOUNT);

        tracing::debug!(
            "overflow controller {} destroyed ({} stray listeners swept)",
            self.id,
            swept
        );
    }
}

/// Custom scrollbar and edge-shadow controller for one viewport
pub struct OverflowController {
    id: ControllerId,
    inner: Option<Arc<Mutex<ControllerInner>>>,
}

impl OverflowController {
    /// Resolve `viewport`/`content` on the view layer and attach to them.
    /// Yields an inert controller if either cannot be resolved.
    pub fn new<V: ViewLayer>(
        view_layer: &V,
        viewport: &str,
        content: &str,
        config: OverflowConfig,
        scheduler: Arc<dyn TurnScheduler>,
    ) -> Self {
        match view_layer.resolve(viewport, content) {
            Ok(surface) => Self::attach(surface, Capabilities::probe(view_layer), config, scheduler),
            Err(err) => {
                let controller = Self::inert();
                tracing::debug!(
                    "overflow controller {} is inert: {}",
                    controller.id,
                    err
                );
                controller
            }
        }
    }

    /// Attach to an already resolved surface
    pub fn attach(
        surface: Arc<dyn Surface>,
        capabilities: Capabilities,
        config: OverflowConfig,
        scheduler: Arc<dyn TurnScheduler>,
    ) -> Self {
        let id = ControllerId::next();
        let config = Arc::new(config);
        let kind = select_strategy(&capabilities, &config);
        tracing::debug!(
            "controller {}: selected strategy `{}` for {:?}",
            id,
            kind,
            capabilities
        );
        let strategy = create_strategy(kind, Arc::clone(&config));

        let inner = Arc::new_cyclic(|this| {
            Mutex::new(ControllerInner {
                id,
                namespace: id.namespace(),
                model: GeometryModel::from_config(&config),
                config,
                surface,
                scheduler,
                geometry: Geometry::default(),
                clock: ScrollClock::new(),
                edges: EdgeStateTracker::new(),
                kind,
                strategy,
                affordances: SmallVec::new(),
                listeners: Vec::new(),
                lifecycle: Lifecycle::Uninitialized,
                pass_pending: false,
                settle_target: None,
                reconcile_at: None,
                rendered_offset: 0.0,
                scroll_observers: Vec::new(),
                edge_observers: Vec::new(),
                this: this.clone(),
            })
        });
        run_locked(&inner, |inner, _| inner.mount());

        Self {
            id,
            inner: Some(inner),
        }
    }

    /// A controller bound to nothing; every method is a no-op
    pub fn inert() -> Self {
        Self {
            id: ControllerId::next(),
            inner: None,
        }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&ControllerInner) -> R) -> Option<R> {
        self.inner.as_ref().map(|inner| f(&lock(inner)))
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn is_inert(&self) -> bool {
        self.inner.is_none()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.with_inner(|inner| inner.lifecycle).unwrap_or_default()
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.with_inner(|inner| inner.kind)
            .unwrap_or(StrategyKind::None)
    }

    /// Which input strategy is active, for diagnostics
    pub fn active_strategy_description(&self) -> &'static str {
        self.strategy_kind().description()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.metrics().scroll_offset()
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.with_inner(|inner| inner.geometry.metrics)
            .unwrap_or_default()
    }

    pub fn thumb(&self) -> ThumbGeometry {
        self.with_inner(|inner| inner.geometry.thumb)
            .unwrap_or_default()
    }

    pub fn geometry(&self) -> Geometry {
        self.with_inner(|inner| inner.geometry).unwrap_or_default()
    }

    pub fn edge_state(&self) -> EdgeState {
        EdgeState::from_metrics(&self.metrics())
    }

    pub fn clock(&self) -> ScrollClock {
        self.with_inner(|inner| inner.clock).unwrap_or_default()
    }

    /// A visual pass is scheduled but has not run yet
    pub fn has_pending_pass(&self) -> bool {
        self.with_inner(|inner| inner.pass_pending)
            .unwrap_or(false)
    }

    /// Remeasure and re-render everything. Safe to call at any time.
    pub fn refresh(&self) {
        if let Some(inner) = &self.inner {
            run_locked(inner, |inner, notes| inner.refresh(notes));
        }
    }

    /// Animate to `target` (clamped). Without a timestamp the clock's latest
    /// update timestamp is reused.
    pub fn scroll_to(&self, target: f32, timestamp: Option<f64>) {
        if let Some(inner) = &self.inner {
            run_locked(inner, |inner, _| inner.scroll_to(target, timestamp));
        }
    }

    /// Release every listener and affordance. Idempotent.
    pub fn destroy(&self) {
        if let Some(inner) = &self.inner {
            run_locked(inner, |inner, _| inner.destroy());
        }
    }

    pub fn on_scroll<F>(&self, observer: F)
    where
        F: Fn(&ScrollMetrics) + Send + Sync + 'static,
    {
        if let Some(inner) = &self.inner {
            let mut inner = lock(inner);
            if inner.is_ready() {
                inner.scroll_observers.push(Arc::new(observer));
            }
        }
    }

    pub fn on_edge<F>(&self, observer: F)
    where
        F: Fn(EdgeTransition) + Send + Sync + 'static,
    {
        if let Some(inner) = &self.inner {
            let mut inner = lock(inner);
            if inner.is_ready() {
                inner.edge_observers.push(Arc::new(observer));
            }
        }
    }
}

impl Drop for OverflowController {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for OverflowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverflowController")
            .field("id", &self.id)
            .field("strategy", &self.strategy_kind())
            .field("lifecycle", &self.lifecycle())
            .field("metrics", &self.metrics())
            .finish()
    }
}
