#![forbid(unsafe_code)]

//! Motion strategies for moving the highlight between spots.
//!
//! A [`Motion`] turns the next [`ShapeGeometry`] into a [`MotionPlan`]: a
//! composable tree of parallel and sequential spring/timing segments that
//! writes into the shared [`MotionValues`] owned by the overlay.
//!
//! | Motion | Opacity                          | Shape channels            |
//! |--------|----------------------------------|---------------------------|
//! | Bounce | set to 1                         | springs, in parallel      |
//! | Fade   | 1 → 0, then 0 → 1                | set while fully hidden    |
//! | Slide  | set to 1                         | eased timings, in parallel|
//!
//! # Invariants
//!
//! 1. When a plan completes, every channel equals its target exactly.
//! 2. A plan built mid-flight starts from the current animated values.
//! 3. [`MotionPlan::finish`] applies every remaining segment in order.

use std::time::Duration;

use crate::animation::{
    AnimatedPoint, AnimatedValue, Animation, Easing, SpringConfig, SpringTo, Timing,
};
use crate::geometry::Point;
use crate::shape::{Shape, ShapeGeometry};

/// Named transition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Motion {
    #[default]
    Bounce,
    Fade,
    Slide,
}

impl Motion {
    /// Lowercase name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bounce => "bounce",
            Self::Fade => "fade",
            Self::Slide => "slide",
        }
    }

    /// Build the plan that carries `values` to `next`.
    pub fn plan(
        self,
        values: &MotionValues,
        next: &ShapeGeometry,
        timing: &MotionTiming,
    ) -> MotionPlan {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "motion.plan",
            motion = self.as_str(),
            shape = next.shape().as_str()
        );

        let (position, extent) = next.channels();
        let targets = values.channel_targets(position, extent);

        match self {
            Self::Bounce => {
                let mut tracks = vec![MotionPlan::set(values.opacity.clone(), 1.0)];
                tracks.extend(targets.into_iter().map(|(value, to)| {
                    MotionPlan::Spring(SpringTo::new(value, to, timing.spring))
                }));
                MotionPlan::parallel(tracks)
            }
            Self::Fade => MotionPlan::sequence(vec![
                MotionPlan::Timing(
                    Timing::new(values.opacity.clone(), 0.0, timing.fade)
                        .easing(timing.fade_easing),
                ),
                MotionPlan::parallel(
                    targets
                        .into_iter()
                        .map(|(value, to)| MotionPlan::set(value, to))
                        .collect(),
                ),
                MotionPlan::Timing(
                    Timing::new(values.opacity.clone(), 1.0, timing.fade)
                        .easing(timing.fade_easing),
                ),
            ]),
            Self::Slide => {
                let mut tracks = vec![MotionPlan::set(values.opacity.clone(), 1.0)];
                tracks.extend(targets.into_iter().map(|(value, to)| {
                    MotionPlan::Timing(
                        Timing::new(value, to, timing.slide).easing(timing.slide_easing),
                    )
                }));
                MotionPlan::parallel(tracks)
            }
        }
    }
}

/// Constants used by the motion strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionTiming {
    /// Spring used by [`Motion::Bounce`].
    pub spring: SpringConfig,
    /// Duration of each half of [`Motion::Fade`].
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub fade: Duration,
    pub fade_easing: Easing,
    /// Duration of [`Motion::Slide`].
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub slide: Duration,
    pub slide_easing: Easing,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            spring: SpringConfig::BOUNCE,
            fade: Duration::from_millis(400),
            fade_easing: Easing::EaseInOut,
            slide: Duration::from_millis(400),
            slide_easing: Easing::EaseInOut,
        }
    }
}

/// Durations serialized as integer milliseconds.
#[cfg(feature = "serde")]
pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// The animated channels of the highlight.
///
/// `position` and `extent` hold the two [`ShapeGeometry::channels`]
/// vectors; `opacity` is the cut-out opacity.
#[derive(Debug, Clone)]
pub struct MotionValues {
    pub position: AnimatedPoint,
    pub extent: AnimatedPoint,
    pub opacity: AnimatedValue,
}

impl Default for MotionValues {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionValues {
    /// All channels at zero, fully opaque.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: AnimatedPoint::new(Point::ZERO),
            extent: AnimatedPoint::new(Point::ZERO),
            opacity: AnimatedValue::new(1.0),
        }
    }

    /// Jump the shape channels to `geometry` without animating.
    pub fn snap(&self, geometry: &ShapeGeometry) {
        let (position, extent) = geometry.channels();
        self.position.set(position);
        self.extent.set(extent);
    }

    /// The geometry currently described by the channels.
    pub fn geometry(&self, shape: Shape) -> ShapeGeometry {
        ShapeGeometry::from_channels(shape, self.position.get(), self.extent.get())
    }

    /// Current cut-out opacity.
    pub fn opacity(&self) -> f64 {
        self.opacity.get()
    }

    fn channel_targets(&self, position: Point, extent: Point) -> [(AnimatedValue, f64); 4] {
        [
            (self.position.x.clone(), position.x),
            (self.position.y.clone(), position.y),
            (self.extent.x.clone(), extent.x),
            (self.extent.y.clone(), extent.y),
        ]
    }
}

/// Composable animation description.
#[derive(Debug, Clone)]
pub enum MotionPlan {
    /// Run every track together; complete when all are.
    Parallel {
        tracks: Vec<MotionPlan>,
        overshoot: Duration,
    },
    /// Run steps one after another, forwarding leftover time.
    Sequence {
        steps: Vec<MotionPlan>,
        cursor: usize,
        overshoot: Duration,
    },
    Spring(SpringTo),
    Timing(Timing),
}

impl Default for MotionPlan {
    fn default() -> Self {
        Self::idle()
    }
}

impl MotionPlan {
    /// A plan with nothing to do (already complete).
    #[must_use]
    pub fn idle() -> Self {
        Self::parallel(Vec::new())
    }

    #[must_use]
    pub fn parallel(tracks: Vec<MotionPlan>) -> Self {
        Self::Parallel {
            tracks,
            overshoot: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn sequence(steps: Vec<MotionPlan>) -> Self {
        Self::Sequence {
            steps,
            cursor: 0,
            overshoot: Duration::ZERO,
        }
    }

    /// Instantaneous assignment.
    #[must_use]
    pub fn set(value: AnimatedValue, to: f64) -> Self {
        Self::Timing(Timing::set(value, to))
    }

    /// Apply every remaining segment immediately, in order.
    pub fn finish(&mut self) {
        match self {
            Self::Parallel { tracks, .. } => tracks.iter_mut().for_each(Self::finish),
            Self::Sequence { steps, cursor, .. } => {
                for step in steps.iter_mut().skip(*cursor) {
                    step.finish();
                }
                *cursor = steps.len();
            }
            Self::Spring(spring) => spring.finish(),
            Self::Timing(timing) => timing.finish(),
        }
    }
}

impl Animation for MotionPlan {
    fn tick(&mut self, dt: Duration) {
        match self {
            Self::Parallel { tracks, overshoot } => {
                let mut leftover = dt;
                for track in tracks.iter_mut() {
                    if track.is_complete() {
                        continue;
                    }
                    track.tick(dt);
                    let unused = if track.is_complete() {
                        track.overshoot()
                    } else {
                        Duration::ZERO
                    };
                    leftover = leftover.min(unused);
                }
                *overshoot = leftover;
            }
            Self::Sequence {
                steps,
                cursor,
                overshoot,
            } => {
                let mut remaining = dt;
                while let Some(step) = steps.get_mut(*cursor) {
                    step.tick(remaining);
                    if !step.is_complete() {
                        *overshoot = Duration::ZERO;
                        return;
                    }
                    remaining = step.overshoot();
                    *cursor += 1;
                }
                *overshoot = remaining;
            }
            Self::Spring(spring) => spring.tick(dt),
            Self::Timing(timing) => timing.tick(dt),
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Self::Parallel { tracks, .. } => tracks.iter().all(Animation::is_complete),
            Self::Sequence { steps, cursor, .. } => *cursor >= steps.len(),
            Self::Spring(spring) => spring.is_complete(),
            Self::Timing(timing) => timing.is_complete(),
        }
    }

    fn value(&self) -> f32 {
        match self {
            Self::Parallel { tracks, .. } => {
                if tracks.is_empty() {
                    return 1.0;
                }
                tracks.iter().map(Animation::value).sum::<f32>() / tracks.len() as f32
            }
            Self::Sequence { steps, cursor, .. } => {
                if steps.is_empty() {
                    return 1.0;
                }
                let partial = steps.get(*cursor).map_or(0.0, Animation::value);
                ((*cursor as f32 + partial) / steps.len() as f32).clamp(0.0, 1.0)
            }
            Self::Spring(spring) => spring.value(),
            Self::Timing(timing) => timing.value(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Parallel { tracks, overshoot } => {
                tracks.iter_mut().for_each(Animation::reset);
                *overshoot = Duration::ZERO;
            }
            Self::Sequence {
                steps,
                cursor,
                overshoot,
            } => {
                steps.iter_mut().for_each(Animation::reset);
                *cursor = 0;
                *overshoot = Duration::ZERO;
            }
            Self::Spring(spring) => spring.reset(),
            Self::Timing(timing) => timing.reset(),
        }
    }

    fn overshoot(&self) -> Duration {
        match self {
            Self::Parallel { overshoot, .. } | Self::Sequence { overshoot, .. } => *overshoot,
            Self::Spring(spring) => spring.overshoot(),
            Self::Timing(timing) => timing.overshoot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::shape::ShapeOptions;

    const FRAME: Duration = Duration::from_millis(16);

    fn run(plan: &mut MotionPlan, frames: usize) {
        for _ in 0..frames {
            if plan.is_complete() {
                break;
            }
            plan.tick(FRAME);
        }
    }

    fn target() -> ShapeGeometry {
        ShapeOptions::rectangle().geometry(Rect::new(40.0, 300.0, 120.0, 48.0))
    }

    #[test]
    fn bounce_sets_opacity_first() {
        let values = MotionValues::new();
        values.opacity.set(0.2);
        let mut plan = Motion::Bounce.plan(&values, &target(), &MotionTiming::default());
        plan.tick(Duration::ZERO);
        assert_eq!(values.opacity(), 1.0);
        assert!(!plan.is_complete());
    }

    #[test]
    fn bounce_lands_on_target() {
        let values = MotionValues::new();
        let next = target();
        let mut plan = Motion::Bounce.plan(&values, &next, &MotionTiming::default());
        run(&mut plan, 2000);
        assert!(plan.is_complete());
        assert_eq!(values.geometry(Shape::Rectangle), next);
    }

    #[test]
    fn slide_lands_on_target_after_duration() {
        let values = MotionValues::new();
        let next = target();
        let mut plan = Motion::Slide.plan(&values, &next, &MotionTiming::default());
        plan.tick(Duration::from_millis(200));
        assert_ne!(values.geometry(Shape::Rectangle), next);
        plan.tick(Duration::from_millis(200));
        assert!(plan.is_complete());
        assert_eq!(values.geometry(Shape::Rectangle), next);
    }

    #[test]
    fn fade_hides_before_moving() {
        let values = MotionValues::new();
        let next = target();
        let mut plan = Motion::Fade.plan(&values, &next, &MotionTiming::default());

        plan.tick(Duration::from_millis(200));
        assert!(values.opacity() < 1.0);
        assert_eq!(values.position.get(), Point::ZERO);

        plan.tick(Duration::from_millis(200));
        assert_eq!(values.opacity(), 0.0);
        assert_eq!(values.geometry(Shape::Rectangle), next);

        plan.tick(Duration::from_millis(400));
        assert!(plan.is_complete());
        assert_eq!(values.opacity(), 1.0);
    }

    #[test]
    fn sequence_forwards_leftover_time() {
        let a = AnimatedValue::new(0.0);
        let b = AnimatedValue::new(0.0);
        let mut plan = MotionPlan::sequence(vec![
            MotionPlan::Timing(
                Timing::new(a.clone(), 1.0, Duration::from_millis(100)).easing(Easing::Linear),
            ),
            MotionPlan::Timing(
                Timing::new(b.clone(), 1.0, Duration::from_millis(100)).easing(Easing::Linear),
            ),
        ]);
        plan.tick(Duration::from_millis(150));
        assert_eq!(a.get(), 1.0);
        assert!((b.get() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn finish_applies_remaining_steps() {
        let values = MotionValues::new();
        let next = target();
        let mut plan = Motion::Fade.plan(&values, &next, &MotionTiming::default());
        plan.tick(FRAME);
        plan.finish();
        assert!(plan.is_complete());
        assert_eq!(values.opacity(), 1.0);
        assert_eq!(values.geometry(Shape::Rectangle), next);
    }

    #[test]
    fn replan_mid_flight_continues_from_current_values() {
        let values = MotionValues::new();
        let timing = MotionTiming::default();
        let mut plan = Motion::Slide.plan(&values, &target(), &timing);
        plan.tick(Duration::from_millis(200));
        let midway = values.position.get();

        let other = ShapeOptions::rectangle().geometry(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut plan = Motion::Slide.plan(&values, &other, &timing);
        plan.tick(Duration::ZERO);
        assert_eq!(values.position.get(), midway);
        plan.tick(Duration::from_millis(400));
        assert_eq!(values.geometry(Shape::Rectangle), other);
    }

    #[test]
    fn idle_plan_is_complete() {
        let plan = MotionPlan::idle();
        assert!(plan.is_complete());
        assert_eq!(plan.value(), 1.0);
    }

    #[test]
    fn reset_replays_sequence() {
        let v = AnimatedValue::new(0.0);
        let mut plan = MotionPlan::sequence(vec![MotionPlan::set(v.clone(), 3.0)]);
        plan.tick(Duration::ZERO);
        assert!(plan.is_complete());
        plan.reset();
        assert!(!plan.is_complete());
    }

    #[cfg(feature = "serde")]
    mod wire_format {
        use super::*;

        #[test]
        fn motion_and_shape_use_lowercase_names() {
            assert_eq!(serde_json::to_string(&Motion::Slide).unwrap(), r#""slide""#);
            let motion: Motion = serde_json::from_str(r#""fade""#).unwrap();
            assert_eq!(motion, Motion::Fade);
            let shape: ShapeOptions =
                serde_json::from_str(r#"{ "shape": "rectangle" }"#).unwrap();
            assert_eq!(shape.shape, Shape::Rectangle);
            assert_eq!(shape.padding, crate::shape::DEFAULT_PADDING);
        }

        #[test]
        fn timing_durations_are_milliseconds() {
            let timing: MotionTiming = serde_json::from_str(
                r#"{ "fade": 250, "slide_easing": "ease-out", "spring": { "mass": 2.0 } }"#,
            )
            .unwrap();
            assert_eq!(timing.fade, Duration::from_millis(250));
            assert_eq!(timing.slide, MotionTiming::default().slide);
            assert_eq!(timing.slide_easing, Easing::EaseOut);
            assert_eq!(timing.spring.mass, 2.0);
            assert_eq!(timing.spring.stiffness, SpringConfig::BOUNCE.stiffness);

            let json = serde_json::to_value(MotionTiming::default()).unwrap();
            assert_eq!(json["fade"], 400);
            assert_eq!(json["fade_easing"], "ease-in-out");
        }
    }
}
