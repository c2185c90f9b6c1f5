//! Smart Overflow Platform
//!
//! The boundary between the overflow controller and whatever actually draws
//! and scrolls: measurement, native scroll offset, animated transitions,
//! affordance elements, input subscription, and capability probes.
//!
//! [`headless`] provides an in-memory host for tests and tooling.

pub mod capability;
pub mod error;
pub mod headless;
pub mod surface;

pub use capability::{Capabilities, CapabilityProbe, ViewLayer};
pub use error::{Result, SurfaceError};
pub use headless::{AffordanceRecord, HeadlessPlatform, HeadlessSurface};
pub use surface::{Affordance, AffordanceKind, NativeScrolling, Surface};
