#![forbid(unsafe_code)]

//! Timing animation: eased tween of an [`AnimatedValue`] over a fixed duration.
//!
//! # Invariants
//!
//! 1. The start value is captured on the first tick, not on construction.
//! 2. On completion the value is written as exactly `to`.
//! 3. A zero-duration, zero-delay timing completes on its first tick, even a
//!    tick of `Duration::ZERO`. This is how instantaneous "set" steps work.

use std::time::Duration;

use super::{Animation, AnimatedValue, Easing};

/// Eased tween from the current value to `to`.
#[derive(Debug, Clone)]
pub struct Timing {
    value: AnimatedValue,
    to: f64,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    from: Option<f64>,
    elapsed: Duration,
    complete: bool,
}

impl Timing {
    /// Tween `value` to `to` over `duration` with ease-in-out.
    #[must_use]
    pub fn new(value: AnimatedValue, to: f64, duration: Duration) -> Self {
        Self {
            value,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::default(),
            from: None,
            elapsed: Duration::ZERO,
            complete: false,
        }
    }

    /// Instantaneous assignment of `to`.
    #[must_use]
    pub fn set(value: AnimatedValue, to: f64) -> Self {
        Self::new(value, to, Duration::ZERO)
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Wait `delay` before starting (builder pattern).
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Total time including the delay.
    fn total(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }

    /// Jump straight to the end.
    pub fn finish(&mut self) {
        if self.from.is_none() {
            self.from = Some(self.value.get());
        }
        self.elapsed = self.total();
        self.complete = true;
        self.value.set(self.to);
    }
}

impl Animation for Timing {
    fn tick(&mut self, dt: Duration) {
        if self.complete {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.delay {
            return;
        }
        let from = *self.from.get_or_insert_with(|| self.value.get());

        let active = self.elapsed - self.delay;
        if active >= self.duration {
            self.complete = true;
            self.value.set(self.to);
            return;
        }

        let t = active.as_secs_f64() / self.duration.as_secs_f64();
        let eased = self.easing.apply(t);
        self.value.set(from + (self.to - from) * eased);
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn value(&self) -> f32 {
        if self.complete {
            return 1.0;
        }
        let total = self.total();
        if total.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    fn reset(&mut self) {
        self.from = None;
        self.elapsed = Duration::ZERO;
        self.complete = false;
    }

    fn overshoot(&self) -> Duration {
        if self.complete {
            self.elapsed.saturating_sub(self.total())
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_400: Duration = Duration::from_millis(400);

    #[test]
    fn linear_midpoint() {
        let v = AnimatedValue::new(0.0);
        let mut t = Timing::new(v.clone(), 10.0, MS_400).easing(Easing::Linear);
        t.tick(Duration::from_millis(200));
        assert!((v.get() - 5.0).abs() < 1e-9);
        assert!(!t.is_complete());
    }

    #[test]
    fn completes_on_exact_target() {
        let v = AnimatedValue::new(3.3);
        let mut t = Timing::new(v.clone(), 7.7, MS_400);
        for _ in 0..3 {
            t.tick(MS_100);
        }
        assert!(!t.is_complete());
        t.tick(Duration::from_millis(200));
        assert!(t.is_complete());
        assert_eq!(v.get(), 7.7);
        assert_eq!(t.overshoot(), MS_100);
    }

    #[test]
    fn set_completes_on_zero_tick() {
        let v = AnimatedValue::new(0.0);
        let mut t = Timing::set(v.clone(), 1.0);
        t.tick(Duration::ZERO);
        assert!(t.is_complete());
        assert_eq!(v.get(), 1.0);
    }

    #[test]
    fn delay_holds_value() {
        let v = AnimatedValue::new(0.0);
        let mut t = Timing::new(v.clone(), 1.0, MS_400).delay(MS_400);
        t.tick(Duration::from_millis(300));
        assert_eq!(v.get(), 0.0);
        t.tick(Duration::from_millis(300));
        assert!(v.get() > 0.0 && v.get() < 1.0);
        t.tick(MS_400);
        assert_eq!(v.get(), 1.0);
    }

    #[test]
    fn start_value_captured_lazily() {
        let v = AnimatedValue::new(0.0);
        let mut t = Timing::new(v.clone(), 10.0, MS_400).easing(Easing::Linear);
        v.set(6.0);
        t.tick(Duration::from_millis(200));
        assert!((v.get() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn reset_allows_replay() {
        let v = AnimatedValue::new(0.0);
        let mut t = Timing::new(v.clone(), 1.0, MS_100);
        t.tick(MS_100);
        assert!(t.is_complete());
        v.set(0.0);
        t.reset();
        assert!(!t.is_complete());
        t.tick(MS_100);
        assert_eq!(v.get(), 1.0);
    }

    #[test]
    fn finish_jumps_to_target() {
        let v = AnimatedValue::new(0.0);
        let mut t = Timing::new(v.clone(), 9.0, MS_400);
        t.finish();
        assert!(t.is_complete());
        assert_eq!(v.get(), 9.0);
        assert_eq!(t.value(), 1.0);
    }
}
