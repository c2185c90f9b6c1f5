//! Smart Overflow
//!
//! A styleable scroll viewport over hosts whose native scrolling differs by
//! input capability. [`OverflowController`] keeps one authoritative scroll
//! model per viewport and drives a custom thumb, track, step arrows and edge
//! shadows from it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use overflow_animation::AnimationScheduler;
//! use overflow_platform::{Capabilities, HeadlessPlatform, HeadlessSurface};
//! use overflow_scroll::{OverflowConfig, OverflowController};
//!
//! let surface = Arc::new(HeadlessSurface::new(200.0, 1000.0));
//! let mut platform = HeadlessPlatform::new(Capabilities::MOUSE);
//! platform.register("#list", "#list-content", surface.clone());
//!
//! let scheduler = Arc::new(AnimationScheduler::new());
//! let controller = OverflowController::new(
//!     &platform,
//!     "#list",
//!     "#list-content",
//!     OverflowConfig::default(),
//!     scheduler.clone(),
//! );
//!
//! assert_eq!(controller.active_strategy_description(), "no-touch, mouse scroll");
//! assert_eq!(controller.metrics().scroll_space(), 800.0);
//!
//! controller.scroll_to(300.0, None);
//! scheduler.run_until_idle(4);
//! assert_eq!(controller.scroll_offset(), 300.0);
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod edge;
pub mod geometry;
pub mod strategy;

pub use clock::ScrollClock;
pub use config::{ConfigError, OverflowConfig};
pub use controller::{ControllerId, EdgeObserver, Lifecycle, OverflowController, ScrollObserver};
pub use edge::{EdgeState, EdgeStateTracker, EdgeTransition, EdgeUpdate, ShadowVisibility};
pub use geometry::{Geometry, GeometryModel, ScrollMetrics, ThumbGeometry};
pub use strategy::{
    create_strategy, select_strategy, InputStrategy, ScrollRequest, ScrollRequests, ScrollView,
    StrategyKind,
};
