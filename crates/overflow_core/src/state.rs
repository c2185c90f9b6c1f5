//! Small per-widget state machines
//!
//! Widgets define their own state enum and map events to transitions by
//! implementing [`StateTransitions`]:
//!
//! ```rust
//! use overflow_core::events::event_types::*;
//! use overflow_core::state::StateTransitions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
//! enum Pressable {
//!     #[default]
//!     Up,
//!     Down,
//! }
//!
//! impl StateTransitions for Pressable {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Pressable::Up, PRESS) => Some(Pressable::Down),
//!             (Pressable::Down, RELEASE) => Some(Pressable::Up),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut state = Pressable::default();
//! assert!(state.send(PRESS));
//! assert_eq!(state, Pressable::Down);
//! assert!(!state.send(PRESS));
//! ```

use std::hash::Hash;

use crate::events::EventType;

/// Trait for state types that handle event transitions
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventType) -> Option<Self>;

    /// Apply the transition for `event` in place. Returns true if the state changed.
    fn send(&mut self, event: EventType) -> bool {
        match self.on_event(event) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}
