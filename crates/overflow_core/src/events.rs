//! Input event model and dispatch
//!
//! Events are delivered by the host with a timestamp taken from the input
//! source itself. The dispatcher keys listeners by `(target, event type)`
//! and optionally groups them under a namespace so a single owner can
//! release every listener it registered in one call.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

/// Event type identifier
pub type EventType = u32;

/// Input event types understood by the overflow controller
pub mod event_types {
    use super::EventType;

    /// Mouse button pressed
    pub const PRESS: EventType = 1;
    /// Mouse moved
    pub const MOVE: EventType = 2;
    /// Mouse button released
    pub const RELEASE: EventType = 3;

    pub const TOUCH_START: EventType = 10;
    pub const TOUCH_MOVE: EventType = 11;
    pub const TOUCH_END: EventType = 12;

    /// The host scrolled the content surface natively
    pub const NATIVE_SCROLL: EventType = 20;

    /// Content below the viewport was mutated externally
    pub const CONTENT_MUTATED: EventType = 30;

    // Controller lifecycle
    pub const MOUNT: EventType = 60;
    pub const UNMOUNT: EventType = 61;
}

/// Where an event was delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The scrolling content surface
    Content,
    /// The scrollbar thumb
    Thumb,
    /// The scrollbar track behind the thumb
    Track,
    /// Step arrow above the track
    ArrowUp,
    /// Step arrow below the track
    ArrowDown,
    /// Document-level (global) listeners, e.g. drag tracking
    Document,
}

/// An input event with associated data
#[derive(Clone, Debug)]
pub struct InputEvent {
    pub event_type: EventType,
    pub target: EventTarget,
    pub data: EventData,
    /// Milliseconds, supplied by the input source
    pub timestamp: f64,
    pub default_prevented: bool,
}

/// Event-specific data
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventData {
    /// Pointer position on the vertical axis, in page coordinates
    Pointer { y: f32 },
    /// First touch point on the vertical axis, in page coordinates
    Touch { page_y: f32 },
    /// Native scroll position of the content surface
    Scroll { offset: f32 },
    None,
}

impl InputEvent {
    pub fn new(event_type: EventType, target: EventTarget, data: EventData, timestamp: f64) -> Self {
        Self {
            event_type,
            target,
            data,
            timestamp,
            default_prevented: false,
        }
    }

    /// Pointer event (press/move/release)
    pub fn pointer(event_type: EventType, target: EventTarget, y: f32, timestamp: f64) -> Self {
        Self::new(event_type, target, EventData::Pointer { y }, timestamp)
    }

    /// Touch event on the content surface
    pub fn touch(event_type: EventType, page_y: f32, timestamp: f64) -> Self {
        Self::new(
            event_type,
            EventTarget::Content,
            EventData::Touch { page_y },
            timestamp,
        )
    }

    /// Native scroll notification from the content surface
    pub fn native_scroll(offset: f32, timestamp: f64) -> Self {
        Self::new(
            event_types::NATIVE_SCROLL,
            EventTarget::Content,
            EventData::Scroll { offset },
            timestamp,
        )
    }

    /// Content mutation notification
    pub fn content_mutated(timestamp: f64) -> Self {
        Self::new(
            event_types::CONTENT_MUTATED,
            EventTarget::Content,
            EventData::None,
            timestamp,
        )
    }

    /// Vertical position carried by a pointer or touch event
    pub fn position(&self) -> Option<f32> {
        match self.data {
            EventData::Pointer { y } => Some(y),
            EventData::Touch { page_y } => Some(page_y),
            _ => None,
        }
    }

    /// Ask the host to suppress its default handling (text selection, native scroll)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Event handler function type
///
/// Handlers are reference counted so the dispatcher can release its own
/// borrow before invoking them; a handler may then (un)register listeners.
pub type EventHandler = Arc<dyn Fn(&mut InputEvent) + Send + Sync>;

new_key_type! {
    /// Identifies one registered listener
    pub struct ListenerId;
}

/// What a listener is bound to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub target: EventTarget,
    pub event_type: EventType,
    /// Namespace tag shared by listeners of the same owner
    pub namespace: Option<String>,
}

impl Binding {
    pub fn new(target: EventTarget, event_type: EventType) -> Self {
        Self {
            target,
            event_type,
            namespace: None,
        }
    }

    /// Tag the binding with an owner namespace
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

struct Listener {
    binding: Binding,
    handler: EventHandler,
}

/// Dispatches events to registered handlers
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, Listener>,
    /// Registration order per (target, event type)
    index: FxHashMap<(EventTarget, EventType), SmallVec<[ListenerId; 2]>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            index: FxHashMap::default(),
        }
    }

    /// Register an event handler for a binding
    pub fn register(&mut self, binding: Binding, handler: EventHandler) -> ListenerId {
        let key = (binding.target, binding.event_type);
        let id = self.listeners.insert(Listener { binding, handler });
        self.index.entry(key).or_default().push(id);
        id
    }

    /// Remove a single listener. Returns false if it was already gone.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        let key = (listener.binding.target, listener.binding.event_type);
        if let Some(ids) = self.index.get_mut(&key) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        true
    }

    /// Remove every listener registered under `namespace`
    pub fn unregister_namespace(&mut self, namespace: &str) -> usize {
        let ids: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, l)| l.binding.namespace.as_deref() == Some(namespace))
            .map(|(id, _)| id)
            .collect();

        let removed = ids.into_iter().filter(|id| self.unregister(*id)).count();
        tracing::trace!("unregistered {} listeners in namespace {}", removed, namespace);
        removed
    }

    /// Handlers currently bound to `(target, event_type)`, in registration order
    pub fn handlers_for(&self, target: EventTarget, event_type: EventType) -> Vec<EventHandler> {
        self.index
            .get(&(target, event_type))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.listeners.get(*id))
                    .map(|l| Arc::clone(&l.handler))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners in a namespace
    pub fn namespace_len(&self, namespace: &str) -> usize {
        self.listeners
            .values()
            .filter(|l| l.binding.namespace.as_deref() == Some(namespace))
            .count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deliver the way a host does: snapshot the handlers, then call them
    fn dispatch(dispatcher: &EventDispatcher, event: &mut InputEvent) {
        for handler in dispatcher.handlers_for(event.target, event.event_type) {
            handler(event);
        }
    }

    fn counting_handler(counter: &Arc<AtomicUsize>) -> EventHandler {
        let counter = Arc::clone(counter);
        Arc::new(move |_event: &mut InputEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_reaches_matching_binding_only() {
        let mut dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        dispatcher.register(
            Binding::new(EventTarget::Thumb, event_types::PRESS),
            counting_handler(&hits),
        );

        let mut press = InputEvent::pointer(event_types::PRESS, EventTarget::Thumb, 10.0, 1.0);
        dispatch(&dispatcher, &mut press);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Same event type, different target
        let mut track = InputEvent::pointer(event_types::PRESS, EventTarget::Track, 10.0, 2.0);
        dispatch(&dispatcher, &mut track);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_single_listener() {
        let mut dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let id = dispatcher.register(
            Binding::new(EventTarget::Content, event_types::TOUCH_START),
            counting_handler(&hits),
        );
        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert!(dispatcher.is_empty());

        let mut start = InputEvent::touch(event_types::TOUCH_START, 0.0, 0.0);
        dispatch(&dispatcher, &mut start);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_namespace_removal_leaves_other_owners() {
        let mut dispatcher = EventDispatcher::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        for event_type in [event_types::MOVE, event_types::RELEASE] {
            dispatcher.register(
                Binding::new(EventTarget::Document, event_type).in_namespace("overflow.1"),
                counting_handler(&a),
            );
            dispatcher.register(
                Binding::new(EventTarget::Document, event_type).in_namespace("overflow.2"),
                counting_handler(&b),
            );
        }

        assert_eq!(dispatcher.unregister_namespace("overflow.1"), 2);
        assert_eq!(dispatcher.namespace_len("overflow.1"), 0);
        assert_eq!(dispatcher.namespace_len("overflow.2"), 2);

        let mut mv = InputEvent::pointer(event_types::MOVE, EventTarget::Document, 5.0, 3.0);
        dispatch(&dispatcher, &mut mv);
        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut dispatcher = EventDispatcher::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for tag in 0..3 {
            let order = Arc::clone(&order);
            dispatcher.register(
                Binding::new(EventTarget::Content, event_types::NATIVE_SCROLL),
                Arc::new(move |_e: &mut InputEvent| order.lock().unwrap().push(tag)),
            );
        }

        let mut scroll = InputEvent::native_scroll(40.0, 100.0);
        dispatch(&dispatcher, &mut scroll);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_prevent_default_visible_to_caller() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(
            Binding::new(EventTarget::Content, event_types::TOUCH_MOVE),
            Arc::new(|e: &mut InputEvent| e.prevent_default()),
        );

        let mut mv = InputEvent::touch(event_types::TOUCH_MOVE, 12.0, 5.0);
        dispatch(&dispatcher, &mut mv);
        assert!(mv.default_prevented);
        assert_eq!(mv.position(), Some(12.0));
    }
}
