#![forbid(unsafe_code)]

//! Animation primitives: the [`Animation`] trait, easing curves, shared
//! animated values, timing tweens, and damped springs.
//!
//! Animations are advanced explicitly with [`Animation::tick`]. Nothing here
//! reads a clock, so every animation is deterministic given the sequence of
//! `dt` values it receives.
//!
//! # Invariants
//!
//! 1. `value()` is a normalized progress in `[0.0, 1.0]`.
//! 2. A completed animation stays complete until `reset()`.
//! 3. `overshoot()` reports how much of the last `dt` was left unused after
//!    completion, so sequences can forward it to the next item.

use std::time::Duration;

pub mod spring;
pub mod timing;
pub mod value;

pub use spring::{SpringConfig, SpringTo};
pub use timing::Timing;
pub use value::{AnimatedPoint, AnimatedValue};

/// A time-driven animation.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has finished.
    fn is_complete(&self) -> bool;

    /// Normalized progress in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time left over from the tick that completed the animation.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Easing curve applied to a timing animation's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Easing {
    /// Linear interpolation.
    Linear,
    /// Accelerating cubic.
    EaseIn,
    /// Decelerating cubic.
    EaseOut,
    /// Cubic S-curve.
    #[default]
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a progress value (clamped to `[0, 1]`).
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_are_exact() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::EaseOut.apply(3.0), 1.0);
    }

    #[test]
    fn easing_is_monotonic() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!(v >= prev - 1e-9, "{easing:?} not monotonic at {i}");
                prev = v;
            }
        }
    }
}
