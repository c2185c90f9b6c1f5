//! Overflow controller configuration
//!
//! One immutable value built at construction and shared (`Arc`) by every
//! component of a controller. Loadable from TOML; missing keys take their
//! defaults.
//!
//! ```toml
//! has_thumb_arrows = false
//! inertia_factor = 2.5
//! settle_easing = "ease_out_quad"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use overflow_animation::Easing;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for the overflow controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverflowConfig {
    /// Draw a custom thumb
    pub has_thumb: bool,
    /// Draw a track behind the thumb (clicking it pages)
    pub has_thumb_track: bool,
    /// Draw step arrows at both ends of the track
    pub has_thumb_arrows: bool,
    /// Fraction of the viewport scrolled per arrow press
    pub thumb_arrow_step_fraction: f32,
    /// Hide thumb, track and arrows when the content fits
    pub auto_hide_thumb_when_no_overflow: bool,
    /// Allow dragging the thumb with the mouse
    pub user_can_drag_thumb: bool,
    /// Draw top/bottom shadows when content continues past an edge
    pub has_edge_shadows: bool,
    /// Multiplier applied to the last touch speed when a swipe ends
    pub inertia_factor: f32,
    /// Native scroll events closer than this to the last applied one are ignored
    pub native_scroll_debounce_ms: f64,
    /// Touch gestures up to this long are taps, not drags
    pub tap_max_duration_ms: f64,
    /// Duration of settle transitions (swipe release, arrows, `scroll_to`)
    pub settle_duration_ms: f32,
    pub settle_easing: Easing,
    /// Length of each step arrow along the track
    pub arrow_extent: f32,
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self {
            has_thumb: true,
            has_thumb_track: true,
            has_thumb_arrows: true,
            thumb_arrow_step_fraction: 0.1,
            auto_hide_thumb_when_no_overflow: true,
            user_can_drag_thumb: true,
            has_edge_shadows: true,
            inertia_factor: 3.0,
            native_scroll_debounce_ms: 100.0,
            tap_max_duration_ms: 150.0,
            settle_duration_ms: 200.0,
            settle_easing: Easing::Swing,
            arrow_extent: 15.0,
        }
    }
}

impl OverflowConfig {
    /// Thumb only: no track, arrows or shadows
    pub fn minimal() -> Self {
        Self {
            has_thumb_track: false,
            has_thumb_arrows: false,
            has_edge_shadows: false,
            ..Default::default()
        }
    }

    /// Edge shadows without any scrollbar
    pub fn shadows_only() -> Self {
        Self {
            has_thumb: false,
            has_thumb_track: false,
            has_thumb_arrows: false,
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: OverflowConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject values that would make the geometry or gestures meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.thumb_arrow_step_fraction > 0.0 && self.thumb_arrow_step_fraction <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "thumb_arrow_step_fraction",
                reason: format!("{} is outside (0, 1]", self.thumb_arrow_step_fraction),
            });
        }
        non_negative("inertia_factor", self.inertia_factor as f64)?;
        non_negative("native_scroll_debounce_ms", self.native_scroll_debounce_ms)?;
        non_negative("tap_max_duration_ms", self.tap_max_duration_ms)?;
        non_negative("settle_duration_ms", self.settle_duration_ms as f64)?;
        non_negative("arrow_extent", self.arrow_extent as f64)?;
        Ok(())
    }

    /// Whether arrows are actually drawn (they belong to the thumb)
    pub fn arrows_enabled(&self) -> bool {
        self.has_thumb && self.has_thumb_arrows
    }

    /// Whether the track is actually drawn
    pub fn track_enabled(&self) -> bool {
        self.has_thumb && self.has_thumb_track
    }

    /// Track length taken by the arrows at both ends
    pub fn reserved_endpoint_space(&self) -> f32 {
        if self.arrows_enabled() {
            self.arrow_extent * 2.0
        } else {
            0.0
        }
    }

    /// Distance from the viewport top to the start of the thumb's travel
    pub fn endpoint_inset(&self) -> f32 {
        if self.arrows_enabled() {
            self.arrow_extent
        } else {
            0.0
        }
    }

    /// Scroll distance of one arrow press
    pub fn arrow_step(&self, viewport_extent: f32) -> f32 {
        viewport_extent * self.thumb_arrow_step_fraction
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} must be a finite, non-negative number", value),
        })
    }
}
