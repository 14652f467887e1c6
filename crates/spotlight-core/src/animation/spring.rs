#![forbid(unsafe_code)]

//! Spring physics for cutout motion.
//!
//! The force on the moving point is `-k·x - c·v`, divided by the mass to get
//! the acceleration, where `x` is the distance left to the target. Frames
//! are split into equal substeps no longer than 4ms and integrated with
//! semi-implicit Euler, which stays stable for the stiffness range the
//! overlay uses.
//!
//! A spring counts as settled once both the distance and the speed fall
//! under their tolerances. On that tick it lands exactly on the target and
//! stays there until reset.

use std::time::Duration;

use super::{AnimatedValue, Animation};

/// Longest integration substep, in seconds.
const SUBSTEP_SECS: f64 = 0.004;

/// Distance tolerance for settling.
const REST_DISTANCE: f64 = 0.001;

/// Speed tolerance for settling.
const REST_SPEED: f64 = 0.01;

/// Spring tuning constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringConfig {
    /// Heavy and slightly underdamped, used by [`Motion::Bounce`](crate::motion::Motion::Bounce).
    pub const BOUNCE: Self = Self {
        stiffness: 350.0,
        damping: 45.0,
        mass: 4.0,
    };

    /// Clamp to values the integrator can handle.
    fn sanitized(self) -> Self {
        Self {
            stiffness: self.stiffness.max(0.1),
            damping: self.damping.max(0.0),
            mass: self.mass.max(0.001),
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::BOUNCE
    }
}

/// A single number pulled from `start` toward `target`.
#[derive(Debug, Clone)]
pub(crate) struct Spring {
    config: SpringConfig,
    start: f64,
    target: f64,
    position: f64,
    velocity: f64,
    settled: bool,
}

impl Spring {
    pub(crate) fn with_config(start: f64, target: f64, config: SpringConfig) -> Self {
        Self {
            config: config.sanitized(),
            start,
            target,
            position: start,
            velocity: 0.0,
            settled: false,
        }
    }

    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    pub(crate) fn is_at_rest(&self) -> bool {
        self.settled
    }

    /// Integrate over `dt`.
    pub(crate) fn advance(&mut self, dt: Duration) {
        let secs = dt.as_secs_f64();
        if self.settled || secs <= 0.0 {
            return;
        }
        let substeps = (secs / SUBSTEP_SECS).ceil().max(1.0);
        let h = secs / substeps;
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;
        for _ in 0..substeps as u32 {
            let offset = self.position - self.target;
            let accel = -(stiffness * offset + damping * self.velocity) / mass;
            self.velocity += accel * h;
            self.position += self.velocity * h;
        }
        if (self.position - self.target).abs() < REST_DISTANCE && self.velocity.abs() < REST_SPEED
        {
            self.land();
        }
    }

    fn land(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
        self.settled = true;
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.settled
    }

    /// Share of the start-to-target distance covered, clamped to `[0, 1]`.
    fn value(&self) -> f32 {
        let span = self.target - self.start;
        if span.abs() <= f64::EPSILON {
            return if self.settled { 1.0 } else { 0.0 };
        }
        (((self.position - self.start) / span) as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.position = self.start;
        self.velocity = 0.0;
        self.settled = false;
    }
}

/// Springs an [`AnimatedValue`] toward a target.
///
/// The start position is read from the value on the first tick, so a
/// `SpringTo` queued behind other animations starts from wherever they left
/// the value.
#[derive(Debug, Clone)]
pub struct SpringTo {
    value: AnimatedValue,
    target: f64,
    config: SpringConfig,
    spring: Option<Spring>,
}

impl SpringTo {
    /// Spring `value` toward `target`.
    #[must_use]
    pub fn new(value: AnimatedValue, target: f64, config: SpringConfig) -> Self {
        Self {
            value,
            target,
            config,
            spring: None,
        }
    }

    /// Jump straight to the target.
    pub fn finish(&mut self) {
        let mut spring = Spring::with_config(self.target, self.target, self.config);
        spring.land();
        self.spring = Some(spring);
        self.value.set(self.target);
    }
}

impl Animation for SpringTo {
    fn tick(&mut self, dt: Duration) {
        let target = self.target;
        let config = self.config;
        let value = &self.value;
        let spring = self.spring.get_or_insert_with(|| {
            let mut spring = Spring::with_config(value.get(), target, config);
            if (value.get() - target).abs() < REST_DISTANCE {
                spring.land();
            }
            spring
        });
        spring.advance(dt);
        self.value.set(spring.position());
    }

    fn is_complete(&self) -> bool {
        self.spring.as_ref().is_some_and(Spring::is_at_rest)
    }

    fn value(&self) -> f32 {
        self.spring.as_ref().map_or(0.0, Animation::value)
    }

    fn reset(&mut self) {
        self.spring = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn simulate(spring: &mut impl Animation, frames: usize) {
        for _ in 0..frames {
            spring.tick(MS_16);
        }
    }

    #[test]
    fn bounce_config_settles_exactly_on_target() {
        let mut spring = Spring::with_config(0.0, 250.0, SpringConfig::BOUNCE);
        simulate(&mut spring, 600);
        assert!(spring.is_complete());
        assert_eq!(spring.position(), 250.0);
        assert_eq!(spring.value(), 1.0);
    }

    #[test]
    fn bounce_overshoots_before_settling() {
        let mut spring = Spring::with_config(0.0, 100.0, SpringConfig::BOUNCE);
        let mut peak = 0.0_f64;
        for _ in 0..600 {
            spring.tick(MS_16);
            peak = peak.max(spring.position());
        }
        assert!(peak > 100.0, "peak {peak}");
    }

    #[test]
    fn heavier_mass_moves_slower() {
        let light = SpringConfig {
            mass: 1.0,
            ..SpringConfig::BOUNCE
        };
        let mut light = Spring::with_config(0.0, 100.0, light);
        let mut heavy = Spring::with_config(0.0, 100.0, SpringConfig::BOUNCE);
        light.tick(Duration::from_millis(50));
        heavy.tick(Duration::from_millis(50));
        assert!(light.position() > heavy.position());
    }

    #[test]
    fn degenerate_config_is_clamped() {
        let config = SpringConfig {
            stiffness: -5.0,
            damping: -1.0,
            mass: 0.0,
        };
        let spring = Spring::with_config(0.0, 1.0, config);
        assert_eq!(
            spring.config,
            SpringConfig {
                stiffness: 0.1,
                damping: 0.0,
                mass: 0.001
            }
        );
    }

    #[test]
    fn empty_frame_does_not_move() {
        let mut spring = Spring::with_config(0.0, 1.0, SpringConfig::BOUNCE);
        spring.tick(Duration::ZERO);
        assert_eq!(spring.position(), 0.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn reset_returns_to_start() {
        let mut spring = Spring::with_config(3.0, 9.0, SpringConfig::BOUNCE);
        simulate(&mut spring, 600);
        spring.reset();
        assert_eq!(spring.position(), 3.0);
        assert!(!spring.is_complete());
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn spring_to_starts_from_current_value() {
        let value = AnimatedValue::new(40.0);
        let mut anim = SpringTo::new(value.clone(), 80.0, SpringConfig::BOUNCE);
        value.set(60.0);
        anim.tick(MS_16);
        assert!(value.get() > 60.0 && value.get() < 80.0);
    }

    #[test]
    fn spring_to_lands_on_target() {
        let value = AnimatedValue::new(-16.0);
        let mut anim = SpringTo::new(value.clone(), 120.5, SpringConfig::BOUNCE);
        simulate(&mut anim, 1000);
        assert!(anim.is_complete());
        assert_eq!(value.get(), 120.5);
    }

    #[test]
    fn spring_to_already_there_completes_at_once() {
        let value = AnimatedValue::new(5.0);
        let mut anim = SpringTo::new(value.clone(), 5.0, SpringConfig::BOUNCE);
        anim.tick(Duration::ZERO);
        assert!(anim.is_complete());
        assert_eq!(value.get(), 5.0);
    }

    #[test]
    fn spring_to_finish_jumps() {
        let value = AnimatedValue::new(0.0);
        let mut anim = SpringTo::new(value.clone(), 42.0, SpringConfig::BOUNCE);
        anim.finish();
        assert!(anim.is_complete());
        assert_eq!(value.get(), 42.0);
    }
}
