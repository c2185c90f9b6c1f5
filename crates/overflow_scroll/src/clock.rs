//! Timestamp gate for scroll writes
//!
//! Input sources stamp their events. A write is admitted only if it is not
//! older than what has already been rendered, nor older than a write that
//! is still waiting for its visual pass.

/// Tracks the latest admitted and latest rendered timestamps
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollClock {
    last_update: Option<f64>,
    last_applied: Option<f64>,
}

impl ScrollClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a write stamped `timestamp`, recording it as the latest update
    pub fn admit(&mut self, timestamp: f64) -> bool {
        if timestamp.is_nan() {
            return false;
        }
        if self.last_applied.is_some_and(|applied| timestamp < applied) {
            return false;
        }
        if self.last_update.is_some_and(|update| timestamp < update) {
            return false;
        }
        self.last_update = Some(timestamp);
        true
    }

    /// Mark everything admitted so far as rendered
    pub fn commit(&mut self) {
        if self.last_update.is_some() {
            self.last_applied = self.last_update;
        }
    }

    /// An admitted write has not been rendered yet
    pub fn is_pending(&self) -> bool {
        match (self.last_update, self.last_applied) {
            (Some(update), Some(applied)) => update > applied,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// `timestamp` falls within `interval_ms` of the last rendered write
    pub fn within_debounce(&self, timestamp: f64, interval_ms: f64) -> bool {
        self.last_applied
            .is_some_and(|applied| timestamp - applied < interval_ms)
    }

    pub fn last_update_timestamp(&self) -> Option<f64> {
        self.last_update
    }

    pub fn last_applied_timestamp(&self) -> Option<f64> {
        self.last_applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_burst() {
        let mut clock = ScrollClock::new();
        assert!(clock.admit(10.0));
        assert!(clock.admit(30.0));
        assert!(!clock.admit(20.0));
        assert_eq!(clock.last_update_timestamp(), Some(30.0));
    }

    #[test]
    fn test_older_than_applied_is_dropped() {
        let mut clock = ScrollClock::new();
        assert!(clock.admit(50.0));
        clock.commit();
        assert_eq!(clock.last_applied_timestamp(), Some(50.0));

        assert!(!clock.admit(40.0));
        assert!(clock.admit(50.0));
        assert!(clock.admit(60.0));
    }

    #[test]
    fn test_pending() {
        let mut clock = ScrollClock::new();
        assert!(!clock.is_pending());
        clock.admit(1.0);
        assert!(clock.is_pending());
        clock.commit();
        assert!(!clock.is_pending());
        clock.admit(1.0);
        assert!(!clock.is_pending());
        clock.admit(2.0);
        assert!(clock.is_pending());
    }

    #[test]
    fn test_debounce() {
        let mut clock = ScrollClock::new();
        assert!(!clock.within_debounce(0.0, 100.0));

        clock.admit(1000.0);
        clock.commit();
        assert!(clock.within_debounce(1050.0, 100.0));
        assert!(!clock.within_debounce(1100.0, 100.0));
    }

    #[test]
    fn test_nan_rejected() {
        let mut clock = ScrollClock::new();
        assert!(!clock.admit(f64::NAN));
        assert_eq!(clock.last_update_timestamp(), None);
    }
}
