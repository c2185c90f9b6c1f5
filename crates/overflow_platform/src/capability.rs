//! Platform capability probes

use std::sync::Arc;

use crate::error::Result;
use crate::surface::Surface;

/// Input capabilities reported by the host platform
pub trait CapabilityProbe {
    fn supports_touch_input(&self) -> bool;
    fn supports_native_momentum_scroll(&self) -> bool;
    /// Platforms whose probes are known to misreport; they are always
    /// treated as having native momentum scrolling
    fn is_known_unreliable_platform(&self) -> bool {
        false
    }
}

/// Snapshot of the probe results taken once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub touch_input: bool,
    pub native_momentum: bool,
    pub unreliable_probe: bool,
}

impl Capabilities {
    /// Desktop: mouse only
    pub const MOUSE: Capabilities = Capabilities {
        touch_input: false,
        native_momentum: false,
        unreliable_probe: false,
    };

    /// Touch with native momentum scrolling
    pub const NATIVE_TOUCH: Capabilities = Capabilities {
        touch_input: true,
        native_momentum: true,
        unreliable_probe: false,
    };

    /// Touch without native momentum scrolling
    pub const EMULATED_TOUCH: Capabilities = Capabilities {
        touch_input: true,
        native_momentum: false,
        unreliable_probe: false,
    };

    pub fn probe(probe: &dyn CapabilityProbe) -> Self {
        Self {
            touch_input: probe.supports_touch_input(),
            native_momentum: probe.supports_native_momentum_scroll(),
            unreliable_probe: probe.is_known_unreliable_platform(),
        }
    }
}

impl CapabilityProbe for Capabilities {
    fn supports_touch_input(&self) -> bool {
        self.touch_input
    }

    fn supports_native_momentum_scroll(&self) -> bool {
        self.native_momentum
    }

    fn is_known_unreliable_platform(&self) -> bool {
        self.unreliable_probe
    }
}

/// The host view layer: resolves selectors to surfaces and reports capabilities
pub trait ViewLayer: CapabilityProbe {
    fn resolve(&self, viewport: &str, content: &str) -> Result<Arc<dyn Surface>>;
}
