//! Smart Overflow Core
//!
//! Foundational primitives shared by the overflow widgets:
//!
//! - **Input Events**: pointer, touch, native-scroll and mutation events
//!   carrying source timestamps
//! - **Event Dispatch**: listeners keyed by target and type, releasable per
//!   owner namespace
//! - **State Transitions**: tiny event-driven state enums for gestures and
//!   lifecycles

pub mod events;
pub mod state;

pub use events::{
    Binding, EventData, EventDispatcher, EventHandler, EventTarget, EventType, InputEvent,
    ListenerId,
};
pub use state::StateTransitions;
