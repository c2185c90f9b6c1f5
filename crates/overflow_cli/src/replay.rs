//! Gesture replay against the headless host

use std::fmt;
use std::sync::Arc;

use anyhow::{ensure, Result};
use clap::{Subcommand, ValueEnum};
use overflow_animation::AnimationScheduler;
use overflow_core::EventTarget;
use overflow_platform::{
    AffordanceKind, Capabilities, HeadlessPlatform, HeadlessSurface, Surface,
};
use overflow_scroll::{OverflowConfig, OverflowController, StrategyKind};
use serde::Serialize;
use tracing::{debug, info, warn};

const VIEWPORT_SELECTOR: &str = "#viewport";
const CONTENT_SELECTOR: &str = "#content";

/// Interval between synthetic input samples
const FRAME_MS: f64 = 16.0;
/// Samples per gesture
const STEPS: u32 = 10;

/// Simulated input platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    /// Desktop, mouse only
    Mouse,
    /// Touch with native momentum scrolling
    Native,
    /// Touch without native momentum scrolling
    Touch,
    /// Platform whose capability probe misreports
    Legacy,
}

impl Platform {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Platform::Mouse => Capabilities::MOUSE,
            Platform::Native => Capabilities::NATIVE_TOUCH,
            Platform::Touch => Capabilities::EMULATED_TOUCH,
            Platform::Legacy => Capabilities {
                unreliable_probe: true,
                ..Capabilities::MOUSE
            },
        }
    }
}

/// A scripted gesture
#[derive(Debug, Clone, Copy, PartialEq, Subcommand)]
pub enum Gesture {
    /// Drag the thumb between two page positions
    Drag { from: f32, to: f32 },
    /// Swipe a finger across the content
    Swipe {
        from: f32,
        to: f32,
        duration_ms: f64,
    },
    /// Call `scroll_to` directly
    ScrollTo {
        #[arg(allow_hyphen_values = true)]
        offset: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub viewport: f32,
    pub content: f32,
    pub platform: Platform,
}

/// Final state of the model after a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub strategy: String,
    pub viewport_extent: f32,
    pub content_extent: f32,
    pub scroll_space: f32,
    pub scroll_offset: f32,
    pub host_offset: f32,
    pub thumb_length: f32,
    pub thumb_position: f32,
    pub thumb_ratio: f32,
    pub thumb_visible: bool,
    pub is_at_top: bool,
    pub is_at_bottom: bool,
    pub has_overflow: bool,
    pub shadow_top: bool,
    pub shadow_bottom: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "strategy:      {}", self.strategy)?;
        writeln!(
            f,
            "extents:       viewport {} / content {} (scroll space {})",
            self.viewport_extent, self.content_extent, self.scroll_space
        )?;
        writeln!(
            f,
            "offset:        {} (host {})",
            self.scroll_offset, self.host_offset
        )?;
        writeln!(
            f,
            "thumb:         length {} at {} (ratio {:.4}, {})",
            self.thumb_length,
            self.thumb_position,
            self.thumb_ratio,
            if self.thumb_visible { "visible" } else { "hidden" }
        )?;
        writeln!(
            f,
            "edges:         top={} bottom={} overflow={}",
            self.is_at_top, self.is_at_bottom, self.has_overflow
        )?;
        write!(
            f,
            "shadows:       top={} bottom={}",
            self.shadow_top, self.shadow_bottom
        )
    }
}

/// A headless host with one controller attached
pub struct Session {
    surface: Arc<HeadlessSurface>,
    scheduler: Arc<AnimationScheduler>,
    controller: OverflowController,
    now: f64,
}

impl Session {
    pub fn new(options: &ReplayOptions, config: OverflowConfig) -> Result<Self> {
        ensure!(
            options.viewport.is_finite() && options.viewport > 0.0,
            "viewport must be a positive number, got {}",
            options.viewport
        );
        ensure!(
            options.content.is_finite() && options.content >= 0.0,
            "content must be a non-negative number, got {}",
            options.content
        );

        let surface = Arc::new(HeadlessSurface::new(options.viewport, options.content));
        let mut platform = HeadlessPlatform::new(options.platform.capabilities());
        platform.register(VIEWPORT_SELECTOR, CONTENT_SELECTOR, Arc::clone(&surface));

        let scheduler = Arc::new(AnimationScheduler::new());
        let controller = OverflowController::new(
            &platform,
            VIEWPORT_SELECTOR,
            CONTENT_SELECTOR,
            config,
            scheduler.clone(),
        );
        ensure!(!controller.is_inert(), "headless surface could not be resolved");

        info!(
            "attached to {}x{} on {:?}: {}",
            options.viewport,
            options.content,
            options.platform,
            controller.active_strategy_description()
        );

        Ok(Self {
            surface,
            scheduler,
            controller,
            now: 0.0,
        })
    }

    fn tick(&mut self, dt_ms: f64) -> f64 {
        self.now += dt_ms;
        self.now
    }

    fn sample(from: f32, to: f32, step: u32) -> f32 {
        from + (to - from) * step as f32 / STEPS as f32
    }

    pub fn replay(&mut self, gesture: Gesture) {
        debug!("replaying {:?}", gesture);
        match gesture {
            Gesture::Drag { from, to } => self.drag(from, to),
            Gesture::Swipe {
                from,
                to,
                duration_ms,
            } => self.swipe(from, to, duration_ms),
            Gesture::ScrollTo { offset } => {
                let now = self.tick(FRAME_MS);
                self.controller.scroll_to(offset, Some(now));
            }
        }
        self.drain();
    }

    fn drag(&mut self, from: f32, to: f32) {
        if self.controller.strategy_kind() != StrategyKind::MouseThumbDrag {
            warn!(
                "thumb drag has no effect with strategy `{}`",
                self.controller.active_strategy_description()
            );
        }

        let now = self.tick(FRAME_MS);
        self.surface.press(EventTarget::Thumb, from, now);
        for step in 1..=STEPS {
            let now = self.tick(FRAME_MS);
            self.surface.move_pointer(Self::sample(from, to, step), now);
            self.scheduler.run_turn();
        }
        let now = self.tick(FRAME_MS);
        self.surface.release(to, now);
    }

    fn swipe(&mut self, from: f32, to: f32, duration_ms: f64) {
        let interval = duration_ms.max(0.0) / STEPS as f64;
        match self.controller.strategy_kind() {
            StrategyKind::NativeTouchScroll | StrategyKind::None => {
                // The host scrolls by itself and reports it
                let start = self.surface.current_native_scroll_offset();
                for step in 1..=STEPS {
                    let now = self.tick(interval);
                    let offset = start + (from - Self::sample(from, to, step));
                    self.surface.native_scroll_to(offset, now);
                    self.scheduler.run_turn();
                }
            }
            kind => {
                if kind == StrategyKind::MouseThumbDrag {
                    warn!("touch swipe has no effect on a mouse platform");
                }
                let now = self.tick(FRAME_MS);
                self.surface.touch_start(from, now);
                for step in 1..=STEPS {
                    let now = self.tick(interval);
                    self.surface.touch_move(Self::sample(from, to, step), now);
                    self.scheduler.run_turn();
                }
                let now = self.now;
                self.surface.touch_end(to, now);
            }
        }
    }

    /// Run deferred passes and let host transitions finish
    fn drain(&mut self) {
        let passes = self.scheduler.run_until_idle(16);
        let mut frames = 0u32;
        while self.surface.advance(FRAME_MS as f32) {
            frames += 1;
        }
        self.tick(FRAME_MS * frames as f64);
        debug!("drained {} passes and {} animation frames", passes, frames);
    }

    pub fn report(&self) -> Report {
        let geometry = self.controller.geometry();
        let metrics = geometry.metrics;
        let edges = self.controller.edge_state();
        Report {
            strategy: self.controller.active_strategy_description().to_string(),
            viewport_extent: metrics.viewport_extent(),
            content_extent: metrics.content_extent(),
            scroll_space: metrics.scroll_space(),
            scroll_offset: metrics.scroll_offset(),
            host_offset: self.surface.current_native_scroll_offset(),
            thumb_length: geometry.thumb.thumb_length,
            thumb_position: geometry.current_thumb_position(),
            thumb_ratio: geometry.thumb.thumb_ratio,
            thumb_visible: self.surface.is_visible(AffordanceKind::Thumb),
            is_at_top: edges.is_at_top,
            is_at_bottom: edges.is_at_bottom,
            has_overflow: edges.has_overflow,
            shadow_top: self.surface.is_visible(AffordanceKind::ShadowTop),
            shadow_bottom: self.surface.is_visible(AffordanceKind::ShadowBottom),
        }
    }
}

/// Build a session, replay `gesture`, and report the final state
pub fn run(options: &ReplayOptions, config: OverflowConfig, gesture: Gesture) -> Result<Report> {
    let mut session = Session::new(options, config)?;
    session.replay(gesture);
    Ok(session.report())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(platform: Platform) -> ReplayOptions {
        ReplayOptions {
            viewport: 200.0,
            content: 1000.0,
            platform,
        }
    }

    #[test]
    fn test_drag_to_track_end_reaches_bottom() {
        let report = run(
            &options(Platform::Mouse),
            OverflowConfig::default(),
            Gesture::Drag { from: 15.0, to: 145.0 },
        )
        .unwrap();

        assert_eq!(report.strategy, "no-touch, mouse scroll");
        assert_eq!(report.scroll_offset, 800.0);
        assert_eq!(report.host_offset, 800.0);
        assert!(report.is_at_bottom);
        assert!(report.shadow_top);
        assert!(!report.shadow_bottom);
    }

    #[test]
    fn test_touch_swipe_settles_past_release() {
        let report = run(
            &options(Platform::Touch),
            OverflowConfig::default(),
            Gesture::Swipe {
                from: 500.0,
                to: 300.0,
                duration_ms: 400.0,
            },
        )
        .unwrap();

        assert_eq!(report.strategy, "touch, touch scroll");
        // 200px of finger travel, then 3 x 20px of inertia
        assert!((report.scroll_offset - 260.0).abs() < 0.01);
        assert!((report.host_offset - 260.0).abs() < 0.01);
    }

    #[test]
    fn test_native_swipe_is_followed() {
        let report = run(
            &options(Platform::Native),
            OverflowConfig::default(),
            Gesture::Swipe {
                from: 500.0,
                to: 300.0,
                duration_ms: 400.0,
            },
        )
        .unwrap();

        assert_eq!(report.strategy, "touch, native scroll + onscroll events");
        assert_eq!(report.host_offset, 200.0);
        assert_eq!(report.scroll_offset, 200.0);
    }

    #[test]
    fn test_scroll_to_is_clamped() {
        let report = run(
            &options(Platform::Legacy),
            OverflowConfig::default(),
            Gesture::ScrollTo { offset: 5000.0 },
        )
        .unwrap();

        assert_eq!(report.strategy, "touch, native scroll + onscroll events");
        assert_eq!(report.scroll_offset, 800.0);
        assert_eq!(report.host_offset, 800.0);
    }

    #[test]
    fn test_invalid_extents_rejected() {
        let bad = ReplayOptions {
            viewport: 0.0,
            content: 100.0,
            platform: Platform::Mouse,
        };
        assert!(Session::new(&bad, OverflowConfig::default()).is_err());
    }

    #[test]
    fn test_report_display() {
        let session = Session::new(&options(Platform::Mouse), OverflowConfig::minimal()).unwrap();
        let text = session.report().to_string();
        assert!(text.contains("strategy:      no-touch, mouse scroll"));
        assert!(text.contains("scroll space 800"));
        assert!(text.contains("shadows:       top=false bottom=false"));
    }
}
