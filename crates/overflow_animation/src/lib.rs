//! Smart Overflow Animation
//!
//! - **Easing**: curves for settle transitions
//! - **Tweens**: fixed-duration scalar transitions used by hosts to animate
//!   scroll positions
//! - **Turn scheduler**: defers visual recomputation to the next cooperative
//!   turn so bursts of input coalesce

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{AnimationScheduler, DeferredTask, TurnScheduler};
pub use tween::Tween;
