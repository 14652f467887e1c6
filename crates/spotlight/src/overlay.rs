#![forbid(unsafe_code)]

//! Overlay renderer state.
//!
//! The overlay owns every animated value derived from the spot: the cut-out
//! shape channels, the cut-out opacity and the tooltip opacity. It never
//! writes the spot itself; the tour tells it where the spot went and it
//! animates there.
//!
//! # Tooltip fade
//!
//! On every step change the tooltip opacity is reset to 0, then fades to 1
//! after [`TooltipFade::delay`] over [`TooltipFade::duration`]. Hiding fades
//! it back to 0 and hands out a [`TooltipHidden`] future that resolves when
//! the fade completes, when the overlay is reset, or when a new step is
//! shown, whichever comes first.
//!
//! # Shape changes
//!
//! Moving between two spots of the same shape kind runs the step's motion
//! strategy. When the kind changes (circle ↔ rectangle), or when nothing was
//! highlighted before, the channels jump straight to the new geometry.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use spotlight_core::animation::{AnimatedValue, Animation, Timing};
use spotlight_core::color::Rgba;
use spotlight_core::geometry::{Point, Rect, Size};
use spotlight_core::motion::{Motion, MotionPlan, MotionTiming, MotionValues};
use spotlight_core::shape::{Shape, ShapeGeometry, ShapeOptions};
use spotlight_layout::floating::{ArrowPosition, FloatingOptions, FloatingStyle};
use spotlight_layout::placement::TooltipPlacement;
use tokio::sync::oneshot;

use crate::config::{BackdropBehavior, TooltipFade, TourConfig};
use crate::error::TourError;
use crate::tour::TourControls;

/// Viewport used for placement until the host reports one.
const UNBOUNDED: Rect = Rect::new(-1.0e9, -1.0e9, 2.0e9, 2.0e9);

// ---------------------------------------------------------------------------
// Backdrop press
// ---------------------------------------------------------------------------

/// Callback run on backdrop press with the tour's capability set.
pub type BackdropHandler = Rc<dyn Fn(&TourControls) -> LocalBoxFuture<'static, Result<(), TourError>>>;

/// What pressing the backdrop does.
#[derive(Clone)]
pub enum BackdropAction {
    /// Go to the next step, or stop on the last one.
    Continue,
    Stop,
    Custom(BackdropHandler),
}

impl BackdropAction {
    /// A custom handler.
    pub fn custom(
        handler: impl Fn(&TourControls) -> LocalBoxFuture<'static, Result<(), TourError>> + 'static,
    ) -> Self {
        Self::Custom(Rc::new(handler))
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Stop => "stop",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for BackdropAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Continue => "Continue",
            Self::Stop => "Stop",
            Self::Custom(_) => "Custom(..)",
        })
    }
}

impl From<BackdropBehavior> for BackdropAction {
    fn from(behavior: BackdropBehavior) -> Self {
        match behavior {
            BackdropBehavior::Continue => Self::Continue,
            BackdropBehavior::Stop => Self::Stop,
        }
    }
}

// ---------------------------------------------------------------------------
// Hide-and-wait
// ---------------------------------------------------------------------------

/// Resolves once the tooltip has finished hiding.
#[derive(Debug)]
#[must_use = "the tooltip keeps fading whether or not this is awaited"]
pub struct TooltipHidden {
    rx: Option<oneshot::Receiver<()>>,
}

impl TooltipHidden {
    pub(crate) fn ready() -> Self {
        Self { rx: None }
    }
}

impl Future for TooltipHidden {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.rx.as_mut() {
            None => Poll::Ready(()),
            // A dropped sender (overlay gone) also counts as hidden.
            Some(rx) => Pin::new(rx).poll(cx).map(|_| ()),
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The dimmed full-screen layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub color: Rgba,
    pub opacity: f64,
}

/// Arrow to draw on the tooltip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowScene {
    pub position: ArrowPosition,
    pub size: f64,
    pub color: Option<Rgba>,
}

/// The positioned tooltip and its content.
#[derive(Debug, Clone)]
pub struct TooltipScene<E> {
    pub style: FloatingStyle,
    pub opacity: f64,
    pub arrow: Option<ArrowScene>,
    pub content: E,
}

/// Everything the host paints for one frame.
#[derive(Debug, Clone)]
pub struct OverlayScene<E> {
    pub backdrop: Backdrop,
    /// Highlight cut out of the backdrop, at its animated position.
    pub cutout: ShapeGeometry,
    pub cutout_opacity: f64,
    pub tooltip: TooltipScene<E>,
    /// Whether the host should run its animations natively.
    pub native_driver: bool,
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

pub(crate) struct Overlay {
    values: MotionValues,
    plan: MotionPlan,
    /// Shape kind on screen; `None` when nothing is highlighted.
    shape: Option<Shape>,
    /// Geometry the current plan is heading to.
    target: Option<ShapeGeometry>,
    tooltip_opacity: AnimatedValue,
    tooltip_plan: MotionPlan,
    hiding: bool,
    waiters: Vec<oneshot::Sender<()>>,
    placement: TooltipPlacement,
    viewport: Rect,
    tooltip_size: Size,
    timing: MotionTiming,
    fade: TooltipFade,
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("shape", &self.shape)
            .field("target", &self.target)
            .field("tooltip_opacity", &self.tooltip_opacity)
            .field("hiding", &self.hiding)
            .field("waiters", &self.waiters.len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Overlay {
    pub(crate) fn new(config: &TourConfig) -> Self {
        Self {
            values: MotionValues::new(),
            plan: MotionPlan::idle(),
            shape: None,
            target: None,
            tooltip_opacity: AnimatedValue::new(0.0),
            tooltip_plan: MotionPlan::idle(),
            hiding: false,
            waiters: Vec::new(),
            placement: TooltipPlacement::new(),
            viewport: Rect::ZERO,
            tooltip_size: Size::ZERO,
            timing: config.motion_timing,
            fade: config.tooltip,
        }
    }

    /// Animate the highlight toward `spot`.
    pub(crate) fn move_to(&mut self, spot: Rect, options: ShapeOptions, motion: Motion) {
        if spot.is_empty() {
            self.plan = MotionPlan::idle();
            self.shape = None;
            self.target = None;
            self.values.snap(&ShapeGeometry::empty(options.shape));
            return;
        }

        let next = options.geometry(spot);
        match self.shape {
            Some(kind) if kind == next.shape() => {
                tracing::debug!(
                    message = "overlay.motion",
                    motion = motion.as_str(),
                    shape = kind.as_str()
                );
                self.plan = motion.plan(&self.values, &next, &self.timing);
                // Apply leading "set" segments right away.
                self.plan.tick(Duration::ZERO);
            }
            _ => {
                tracing::debug!(
                    message = "overlay.motion",
                    motion = "snap",
                    shape = next.shape().as_str()
                );
                self.plan = MotionPlan::idle();
                self.values.snap(&next);
                self.values.opacity.set(1.0);
            }
        }
        self.shape = Some(next.shape());
        self.target = Some(next);
    }

    /// Start the tooltip fade-in for a newly active step.
    pub(crate) fn show_tooltip(&mut self) {
        self.resolve_waiters();
        self.hiding = false;
        self.tooltip_plan = MotionPlan::sequence(vec![
            MotionPlan::set(self.tooltip_opacity.clone(), 0.0),
            MotionPlan::Timing(
                Timing::new(self.tooltip_opacity.clone(), 1.0, self.fade.duration)
                    .delay(self.fade.delay),
            ),
        ]);
        self.tooltip_plan.tick(Duration::ZERO);
    }

    /// Fade the tooltip out. `visible` is false when no step is on screen.
    pub(crate) fn hide_tooltip(&mut self, visible: bool) -> TooltipHidden {
        if !visible || self.fade.duration.is_zero() || self.tooltip_opacity.get() <= 0.0 {
            self.tooltip_plan = MotionPlan::idle();
            self.tooltip_opacity.set(0.0);
            return TooltipHidden::ready();
        }

        self.hiding = true;
        self.tooltip_plan = MotionPlan::Timing(Timing::new(
            self.tooltip_opacity.clone(),
            0.0,
            self.fade.duration,
        ));
        self.tooltip_plan.tick(Duration::ZERO);
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        TooltipHidden { rx: Some(rx) }
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        self.plan.tick(dt);
        self.tooltip_plan.tick(dt);
        if self.hiding && self.tooltip_plan.is_complete() {
            self.hiding = false;
            tracing::debug!(message = "overlay.tooltip.hidden", waiters = self.waiters.len());
            self.resolve_waiters();
        }
    }

    /// Jump every running animation to its end.
    pub(crate) fn finish(&mut self) {
        self.plan.finish();
        self.tooltip_plan.finish();
        if self.hiding {
            self.hiding = false;
            self.resolve_waiters();
        }
    }

    pub(crate) fn is_animating(&self) -> bool {
        !self.plan.is_complete() || !self.tooltip_plan.is_complete()
    }

    /// Back to the initial state; pending hide waiters resolve.
    pub(crate) fn reset(&mut self) {
        self.resolve_waiters();
        self.hiding = false;
        self.plan = MotionPlan::idle();
        self.tooltip_plan = MotionPlan::idle();
        self.tooltip_opacity.set(0.0);
        self.values.snap(&ShapeGeometry::empty(Shape::Circle));
        self.values.opacity.set(1.0);
        self.shape = None;
        self.target = None;
        self.placement.invalidate();
    }

    fn resolve_waiters(&mut self) {
        for tx in self.waiters.drain(..) {
            // The receiver may have been dropped; nothing to notify then.
            let _ = tx.send(());
        }
    }

    /// The cut-out at its animated position.
    pub(crate) fn cutout(&self) -> Option<ShapeGeometry> {
        self.shape.map(|shape| self.values.geometry(shape))
    }

    pub(crate) fn cutout_opacity(&self) -> f64 {
        self.values.opacity()
    }

    pub(crate) fn tooltip_opacity(&self) -> f64 {
        self.tooltip_opacity.get()
    }

    /// Place the tooltip around the highlight's final bounds.
    pub(crate) fn place_tooltip(&mut self, options: &FloatingOptions) -> Option<FloatingStyle> {
        let anchor = self.target.map(|target| target.bounds());
        let viewport = if self.viewport.is_empty() {
            UNBOUNDED
        } else {
            self.viewport
        };
        self.placement
            .update(anchor, options, self.tooltip_size, viewport)
    }

    pub(crate) fn placement_computations(&self) -> u64 {
        self.placement.computations()
    }

    pub(crate) fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub(crate) fn set_tooltip_size(&mut self, size: Size) {
        self.tooltip_size = size;
    }

    /// Whether `point` falls inside the highlighted area.
    pub(crate) fn hit_cutout(&self, point: Point) -> bool {
        self.cutout().is_some_and(|cutout| cutout.contains(point))
    }
}
