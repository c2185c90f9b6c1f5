//! Scroll and thumb geometry
//!
//! Pure functions of the raw measurements. Every derived value is finite:
//! negative or non-finite measurements count as zero, and the thumb ratio
//! collapses to zero when there is nothing to scroll.

use crate::config::OverflowConfig;

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Raw measurements plus the authoritative scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    viewport_extent: f32,
    content_extent: f32,
    scroll_space: f32,
    scroll_offset: f32,
}

impl ScrollMetrics {
    /// Visible height of the viewport
    pub fn viewport_extent(&self) -> f32 {
        self.viewport_extent
    }

    /// Total height of the content
    pub fn content_extent(&self) -> f32 {
        self.content_extent
    }

    /// Maximum scroll offset
    pub fn scroll_space(&self) -> f32 {
        self.scroll_space
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn has_overflow(&self) -> bool {
        self.content_extent > self.viewport_extent
    }

    /// Clamp `target` into `[0, scroll_space]`. NaN goes to the top.
    pub fn clamp_offset(&self, target: f32) -> f32 {
        if target.is_nan() {
            0.0
        } else {
            target.clamp(0.0, self.scroll_space)
        }
    }
}

/// Thumb size and travel derived from the metrics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbGeometry {
    /// Thumb length along the track
    pub thumb_length: f32,
    /// Distance the thumb can move
    pub thumb_travel: f32,
    /// Thumb pixels per scrolled content pixel
    pub thumb_ratio: f32,
}

/// Snapshot of metrics and thumb geometry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub metrics: ScrollMetrics,
    pub thumb: ThumbGeometry,
    /// Track offset where the thumb's travel starts (below the top arrow)
    pub endpoint_inset: f32,
}

impl Geometry {
    pub fn clamp_offset(&self, target: f32) -> f32 {
        self.metrics.clamp_offset(target)
    }

    /// Copy of this geometry scrolled to `offset` (clamped)
    pub fn with_offset(&self, offset: f32) -> Geometry {
        let mut next = *self;
        next.metrics.scroll_offset = self.clamp_offset(offset);
        next
    }

    /// Thumb position along the track for `offset`
    pub fn thumb_position(&self, offset: f32) -> f32 {
        let along = (offset * self.thumb.thumb_ratio).clamp(0.0, self.thumb.thumb_travel);
        let along = if along.is_nan() { 0.0 } else { along };
        self.endpoint_inset + along
    }

    /// Thumb position for the current offset
    pub fn current_thumb_position(&self) -> f32 {
        self.thumb_position(self.metrics.scroll_offset)
    }
}

/// Computes [`Geometry`] from measurements
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryModel {
    pub reserved_endpoint_space: f32,
    pub endpoint_inset: f32,
}

impl GeometryModel {
    pub fn new(reserved_endpoint_space: f32, endpoint_inset: f32) -> Self {
        Self {
            reserved_endpoint_space: sanitize(reserved_endpoint_space),
            endpoint_inset: sanitize(endpoint_inset),
        }
    }

    pub fn from_config(config: &OverflowConfig) -> Self {
        Self::new(config.reserved_endpoint_space(), config.endpoint_inset())
    }

    /// Derive geometry, carrying `previous_offset` forward clamped to the new range
    pub fn compute(&self, viewport_extent: f32, content_extent: f32, previous_offset: f32) -> Geometry {
        let viewport_extent = sanitize(viewport_extent);
        let content_extent = sanitize(content_extent);
        let scroll_space = (content_extent - viewport_extent).max(0.0);

        let thumb_length = if content_extent > viewport_extent {
            (viewport_extent * viewport_extent / content_extent).round()
        } else {
            viewport_extent
        };
        let thumb_travel = (viewport_extent - thumb_length - self.reserved_endpoint_space).max(0.0);
        let thumb_ratio = if scroll_space > 0.0 {
            (thumb_travel / scroll_space).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut metrics = ScrollMetrics {
            viewport_extent,
            content_extent,
            scroll_space,
            scroll_offset: 0.0,
        };
        metrics.scroll_offset = metrics.clamp_offset(previous_offset);

        Geometry {
            metrics,
            thumb: ThumbGeometry {
                thumb_length,
                thumb_travel,
                thumb_ratio,
            },
            endpoint_inset: self.endpoint_inset,
        }
    }
}
