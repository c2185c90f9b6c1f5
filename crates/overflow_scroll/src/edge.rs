//! Edge detection
//!
//! Tracks whether the viewport sits at the top or bottom of its content and
//! whether there is anything to scroll at all. Shadow visibility is derived
//! from this state.

use smallvec::SmallVec;

use crate::geometry::ScrollMetrics;

/// Edge flags for one set of metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeState {
    pub is_at_top: bool,
    pub is_at_bottom: bool,
    pub has_overflow: bool,
}

impl EdgeState {
    pub fn from_metrics(metrics: &ScrollMetrics) -> Self {
        Self {
            is_at_top: metrics.scroll_offset() == 0.0,
            is_at_bottom: metrics.scroll_offset() == metrics.scroll_space(),
            has_overflow: metrics.has_overflow(),
        }
    }
}

/// A change in one edge flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeTransition {
    EnteredTop,
    LeftTop,
    EnteredBottom,
    LeftBottom,
    OverflowGained,
    OverflowLost,
}

/// Result of [`EdgeStateTracker::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeUpdate {
    pub top_changed: bool,
    pub bottom_changed: bool,
    pub overflow_changed: bool,
    pub new_state: EdgeState,
    pub transitions: SmallVec<[EdgeTransition; 3]>,
}

impl EdgeUpdate {
    pub fn any_changed(&self) -> bool {
        self.top_changed || self.bottom_changed || self.overflow_changed
    }
}

/// Remembers the last edge state and reports changes
#[derive(Debug, Clone, Default)]
pub struct EdgeStateTracker {
    state: Option<EdgeState>,
}

impl EdgeStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<EdgeState> {
        self.state
    }

    /// Forget the stored state; the next update reports every flag
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn update(&mut self, metrics: &ScrollMetrics) -> EdgeUpdate {
        let new_state = EdgeState::from_metrics(metrics);
        let previous = self.state.replace(new_state);

        let (top_changed, bottom_changed, overflow_changed) = match previous {
            Some(prev) => (
                prev.is_at_top != new_state.is_at_top,
                prev.is_at_bottom != new_state.is_at_bottom,
                prev.has_overflow != new_state.has_overflow,
            ),
            None => (true, true, true),
        };

        let mut transitions = SmallVec::new();
        if top_changed && (previous.is_some() || new_state.is_at_top) {
            transitions.push(if new_state.is_at_top {
                EdgeTransition::EnteredTop
            } else {
                EdgeTransition::LeftTop
            });
        }
        if bottom_changed && (previous.is_some() || new_state.is_at_bottom) {
            transitions.push(if new_state.is_at_bottom {
                EdgeTransition::EnteredBottom
            } else {
                EdgeTransition::LeftBottom
            });
        }
        if overflow_changed && (previous.is_some() || new_state.has_overflow) {
            transitions.push(if new_state.has_overflow {
                EdgeTransition::OverflowGained
            } else {
                EdgeTransition::OverflowLost
            });
        }

        EdgeUpdate {
            top_changed,
            bottom_changed,
            overflow_changed,
            new_state,
            transitions,
        }
    }
}

/// Which edge shadows should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowVisibility {
    pub top: bool,
    pub bottom: bool,
}

impl ShadowVisibility {
    pub fn from_state(state: &EdgeState) -> Self {
        if !state.has_overflow {
            return Self::default();
        }
        Self {
            top: !state.is_at_top,
            bottom: !state.is_at_bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryModel;

    fn metrics(viewport: f32, content: f32, offset: f32) -> ScrollMetrics {
        GeometryModel::default().compute(viewport, content, offset).metrics
    }

    #[test]
    fn test_first_update_reports_everything() {
        let mut tracker = EdgeStateTracker::new();
        let update = tracker.update(&metrics(200.0, 1000.0, 0.0));

        assert!(update.top_changed && update.bottom_changed && update.overflow_changed);
        assert_eq!(
            update.transitions.as_slice(),
            &[EdgeTransition::EnteredTop, EdgeTransition::OverflowGained]
        );
    }

    #[test]
    fn test_transitions_only_on_change() {
        let mut tracker = EdgeStateTracker::new();
        tracker.update(&metrics(200.0, 1000.0, 0.0));

        let update = tracker.update(&metrics(200.0, 1000.0, 10.0));
        assert_eq!(update.transitions.as_slice(), &[EdgeTransition::LeftTop]);

        let update = tracker.update(&metrics(200.0, 1000.0, 20.0));
        assert!(!update.any_changed());
        assert!(update.transitions.is_empty());

        let update = tracker.update(&metrics(200.0, 1000.0, 800.0));
        assert_eq!(update.transitions.as_slice(), &[EdgeTransition::EnteredBottom]);

        let update = tracker.update(&metrics(200.0, 100.0, 800.0));
        assert_eq!(
            update.transitions.as_slice(),
            &[EdgeTransition::EnteredTop, EdgeTransition::OverflowLost]
        );
    }

    #[test]
    fn test_reset_reports_again() {
        let mut tracker = EdgeStateTracker::new();
        tracker.update(&metrics(200.0, 1000.0, 0.0));
        tracker.reset();
        assert!(tracker.state().is_none());
        assert!(tracker.update(&metrics(200.0, 1000.0, 0.0)).any_changed());
    }

    #[test]
    fn test_edge_invariants() {
        for offset in [0.0, 1.0, 400.0, 799.0, 800.0, 2000.0] {
            let m = metrics(200.0, 1000.0, offset);
            let state = EdgeState::from_metrics(&m);
            assert!(!(state.is_at_top && state.is_at_bottom));
            assert_eq!(state.is_at_top, m.scroll_offset() == 0.0);
            assert_eq!(state.is_at_bottom, m.scroll_offset() == 800.0);
        }

        let state = EdgeState::from_metrics(&metrics(200.0, 150.0, 0.0));
        assert!(state.is_at_top && state.is_at_bottom && !state.has_overflow);
    }

    #[test]
    fn test_shadows() {
        let top = EdgeState::from_metrics(&metrics(200.0, 1000.0, 0.0));
        assert_eq!(ShadowVisibility::from_state(&top), ShadowVisibility { top: false, bottom: true });

        let middle = EdgeState::from_metrics(&metrics(200.0, 1000.0, 300.0));
        assert_eq!(ShadowVisibility::from_state(&middle), ShadowVisibility { top: true, bottom: true });

        // Stale flags are ignored without overflow
        let stale = EdgeState {
            is_at_top: false,
            is_at_bottom: false,
            has_overflow: false,
        };
        assert_eq!(ShadowVisibility::from_state(&stale), ShadowVisibility::default());
    }
}
