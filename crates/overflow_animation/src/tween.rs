//! Fixed-duration tweens between two scalar values

use crate::easing::Easing;

/// A single value animated from `from` to `to` over a fixed duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
        }
    }

    /// Advance by `dt_ms` and return the new value
    pub fn step(&mut self, dt_ms: f32) -> f32 {
        if dt_ms > 0.0 {
            self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        }
        self.value()
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        }
    }

    /// Current eased value
    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let eased = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * eased
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    /// Jump straight to the end value
    pub fn finish(&mut self) {
        self.elapsed_ms = self.duration_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_tween_progresses_and_finishes() {
        let mut tween = Tween::new(100.0, 70.0, 200.0, Easing::Linear);
        assert_eq!(tween.value(), 100.0);

        assert!((tween.step(100.0) - 85.0).abs() < 1e-4);
        assert!(!tween.is_finished());

        // Overshooting the duration lands exactly on the target
        assert_eq!(tween.step(500.0), 70.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_zero_duration_is_immediately_finished() {
        let tween = Tween::new(0.0, 40.0, 0.0, Easing::Swing);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 40.0);
        assert_eq!(tween.progress(), 1.0);
    }

    #[test]
    fn test_negative_step_is_ignored() {
        let mut tween = Tween::new(0.0, 10.0, 100.0, Easing::Linear);
        tween.step(50.0);
        let before = tween.value();
        tween.step(-20.0);
        assert_eq!(tween.value(), before);
    }

    #[test]
    fn test_finish_jumps_to_target() {
        let mut tween = Tween::new(5.0, 500.0, 1000.0, Easing::EaseOutCubic);
        tween.step(10.0);
        tween.finish();
        assert_eq!(tween.value(), 500.0);
    }
}
