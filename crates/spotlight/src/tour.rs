#![forbid(unsafe_code)]

//! Tour state machine.
//!
//! [`SpotlightTour`] owns the active step index, the tour status and the
//! spot. Every other component reacts to those three values; none of them
//! writes them directly.
//!
//! # Step transition
//!
//! `go_to(index)` runs three stages, strictly in order:
//!
//! 1. Hide the tooltip of the current step and wait until it is hidden.
//! 2. Run the target step's `before` hook with the target anchor's measured
//!    rectangle, and wait for it. A failing hook aborts the transition and
//!    the error is returned to the caller.
//! 3. Make the target step current and the tour running.
//!
//! Transitions are not serialized against each other. When two overlap, the
//! one that completes last decides the final step.
//!
//! # Invariants
//!
//! - `status == Idle` exactly when `current` is `None`.
//! - `current`, when set, is a valid index into the step list.
//! - After `stop`, the spot is [`Rect::ZERO`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use spotlight_core::geometry::{Point, Rect, Size};
use tracing::Instrument;

use crate::attach::{AnchorRegistry, AnchorTarget};
use crate::config::{Platform, TourConfig};
use crate::error::{Result, TourError};
use crate::overlay::{
    ArrowScene, Backdrop, BackdropAction, Overlay, OverlayScene, TooltipHidden, TooltipScene,
};
use crate::step::TourStep;

/// Lifecycle of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TourStatus {
    /// No step is active.
    #[default]
    Idle,
    Running,
    /// A step is active but the overlay is frozen.
    Paused,
}

impl TourStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

/// Reported to the `on_stop` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopEvent {
    /// Step that was active when the tour stopped.
    pub index: usize,
    pub is_last: bool,
}

/// Operations the state machine exposes to renderers and callbacks.
pub(crate) trait TourDriver {
    fn go_to(self: Rc<Self>, index: usize) -> LocalBoxFuture<'static, Result<()>>;
    fn next(self: Rc<Self>) -> LocalBoxFuture<'static, Result<()>>;
    fn previous(self: Rc<Self>) -> LocalBoxFuture<'static, Result<()>>;
    fn pause(&self);
    fn resume(&self);
    fn stop(&self);
    fn current(&self) -> Option<usize>;
    fn status(&self) -> TourStatus;
    fn step_count(&self) -> usize;
}

/// The capability set handed to step renderers and backdrop handlers.
///
/// Navigation only: no access to the spot or to the step list.
#[derive(Clone)]
pub struct TourControls(Rc<dyn TourDriver>);

impl fmt::Debug for TourControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourControls")
            .field("current", &self.current())
            .field("status", &self.status())
            .finish()
    }
}

impl TourControls {
    pub fn go_to(&self, index: usize) -> LocalBoxFuture<'static, Result<()>> {
        Rc::clone(&self.0).go_to(index)
    }

    pub fn next(&self) -> LocalBoxFuture<'static, Result<()>> {
        Rc::clone(&self.0).next()
    }

    pub fn previous(&self) -> LocalBoxFuture<'static, Result<()>> {
        Rc::clone(&self.0).previous()
    }

    pub fn pause(&self) {
        self.0.pause();
    }

    pub fn resume(&self) {
        self.0.resume();
    }

    pub fn stop(&self) {
        self.0.stop();
    }

    pub fn current(&self) -> Option<usize> {
        self.0.current()
    }

    pub fn status(&self) -> TourStatus {
        self.0.status()
    }

    pub fn step_count(&self) -> usize {
        self.0.step_count()
    }
}

/// What a step's render callback receives.
#[derive(Debug, Clone)]
pub struct RenderProps {
    pub current: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub controls: TourControls,
}

impl RenderProps {
    pub(crate) fn new(current: usize, len: usize, controls: TourControls) -> Self {
        Self {
            current,
            is_first: current == 0,
            is_last: current + 1 >= len,
            controls,
        }
    }

    pub fn next(&self) -> LocalBoxFuture<'static, Result<()>> {
        self.controls.next()
    }

    pub fn previous(&self) -> LocalBoxFuture<'static, Result<()>> {
        self.controls.previous()
    }

    pub fn go_to(&self, index: usize) -> LocalBoxFuture<'static, Result<()>> {
        self.controls.go_to(index)
    }

    pub fn pause(&self) {
        self.controls.pause();
    }

    pub fn resume(&self) {
        self.controls.resume();
    }

    pub fn stop(&self) {
        self.controls.stop();
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TourState {
    current: Option<usize>,
    status: TourStatus,
    spot: Rect,
}

type StopCallback = Box<dyn Fn(StopEvent)>;

struct TourInner<E> {
    steps: Vec<TourStep<E>>,
    config: TourConfig,
    backdrop: Option<BackdropAction>,
    on_stop: Option<StopCallback>,
    native_driver: bool,
    state: RefCell<TourState>,
    overlay: RefCell<Overlay>,
    anchors: Rc<AnchorRegistry>,
}

impl<E> TourInner<E> {
    fn snapshot(&self) -> TourState {
        *self.state.borrow()
    }

    /// Hide, run the hook, then enter `index`.
    async fn transition(self: Rc<Self>, index: usize) -> Result<()> {
        let hidden = {
            let running = self.snapshot().status == TourStatus::Running;
            self.overlay.borrow_mut().hide_tooltip(running)
        };
        hidden.await;

        if let Some(before) = self.steps.get(index).and_then(|step| step.before.clone()) {
            let anchor = self.anchors.measure(index);
            if let Err(source) = before(anchor).await {
                let err = TourError::BeforeHook { index, source };
                tracing::warn!(
                    message = "tour.before.failed",
                    index,
                    error_type = err.error_type(),
                    error = %err
                );
                // Still on the previous step: bring its tooltip back.
                if self.snapshot().status == TourStatus::Running {
                    self.overlay.borrow_mut().show_tooltip();
                }
                return Err(err);
            }
        }

        self.enter(index);
        Ok(())
    }

    fn enter(&self, index: usize) {
        let from = {
            let mut state = self.state.borrow_mut();
            state.status = TourStatus::Running;
            state.current.replace(index)
        };
        tracing::debug!(message = "tour.step", from = ?from, to = index);
        self.overlay.borrow_mut().show_tooltip();
        match self.anchors.measure(index) {
            Some(rect) => self.change_spot(rect),
            // Keep the spot, but highlight it with this step's shape.
            None => self.sync_overlay(Some(index), self.snapshot().spot),
        }
    }

    fn change_spot(&self, rect: Rect) {
        if !rect.is_finite() {
            tracing::debug!(message = "tour.spot.ignored", reason = "non-finite");
            return;
        }
        let current = {
            let mut state = self.state.borrow_mut();
            state.spot = rect;
            state.current
        };
        tracing::debug!(
            message = "tour.spot",
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height
        );
        self.sync_overlay(current, rect);
    }

    fn sync_overlay(&self, current: Option<usize>, rect: Rect) {
        let Some(step) = current.and_then(|index| self.steps.get(index)) else {
            return;
        };
        let shape = step.shape.unwrap_or(self.config.shape);
        let motion = step.motion.unwrap_or(self.config.motion);
        self.overlay.borrow_mut().move_to(rect, shape, motion);
    }
}

impl<E: 'static> TourDriver for TourInner<E> {
    fn go_to(self: Rc<Self>, index: usize) -> LocalBoxFuture<'static, Result<()>> {
        let len = self.steps.len();
        if index >= len {
            tracing::debug!(message = "tour.goto.ignored", index, len);
            return future::ready(Ok(())).boxed_local();
        }
        let span = tracing::debug_span!(
            "transition",
            from = ?self.snapshot().current,
            to = index
        );
        self.transition(index).instrument(span).boxed_local()
    }

    fn next(self: Rc<Self>) -> LocalBoxFuture<'static, Result<()>> {
        match self.snapshot().current {
            None => future::ready(Ok(())).boxed_local(),
            Some(current) if current + 1 >= self.steps.len() => {
                self.stop();
                future::ready(Ok(())).boxed_local()
            }
            Some(current) => self.go_to(current + 1),
        }
    }

    fn previous(self: Rc<Self>) -> LocalBoxFuture<'static, Result<()>> {
        match self.snapshot().current {
            Some(current) if current > 0 => self.go_to(current - 1),
            _ => future::ready(Ok(())).boxed_local(),
        }
    }

    fn pause(&self) {
        let mut state = self.state.borrow_mut();
        if state.status == TourStatus::Running {
            state.status = TourStatus::Paused;
            tracing::debug!(message = "tour.pause", index = ?state.current);
        }
    }

    fn resume(&self) {
        let mut state = self.state.borrow_mut();
        if state.status == TourStatus::Paused {
            state.status = TourStatus::Running;
            tracing::debug!(message = "tour.resume", index = ?state.current);
        }
    }

    fn stop(&self) {
        let stopped = {
            let mut state = self.state.borrow_mut();
            let stopped = state.current.take();
            state.status = TourStatus::Idle;
            state.spot = Rect::ZERO;
            stopped
        };
        self.overlay.borrow_mut().reset();

        let Some(index) = stopped else {
            return;
        };
        let event = StopEvent {
            index,
            is_last: index + 1 == self.steps.len(),
        };
        tracing::debug!(message = "tour.stop", index, is_last = event.is_last);
        if let Some(on_stop) = &self.on_stop {
            on_stop(event);
        }
    }

    fn current(&self) -> Option<usize> {
        self.snapshot().current
    }

    fn status(&self) -> TourStatus {
        self.snapshot().status
    }

    fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl<E> AnchorTarget for TourInner<E> {
    fn current(&self) -> Option<usize> {
        self.snapshot().current
    }

    fn status(&self) -> TourStatus {
        self.snapshot().status
    }

    fn change_spot(&self, rect: Rect) {
        TourInner::change_spot(self, rect);
    }

    fn registry(&self) -> &Rc<AnchorRegistry> {
        &self.anchors
    }
}

/// Handle to a guided tour.
///
/// Cheap to clone; every clone drives the same tour. Futures returned by the
/// navigation methods are `!Send` and must run on the host's local executor,
/// while the host keeps calling [`tick`](Self::tick) from its frame clock.
///
/// ```
/// use futures_util::FutureExt;
/// use spotlight::{SpotlightTour, TourStatus, TourStep};
///
/// let tour = SpotlightTour::new(vec![
///     TourStep::new(|props| format!("step {}", props.current)),
///     TourStep::new(|_| "done".to_string()),
/// ]);
/// tour.start().now_or_never();
/// assert_eq!(tour.current(), Some(0));
/// assert_eq!(tour.status(), TourStatus::Running);
/// tour.stop();
/// assert_eq!(tour.current(), None);
/// ```
pub struct SpotlightTour<E> {
    inner: Rc<TourInner<E>>,
}

impl<E> Clone for SpotlightTour<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for SpotlightTour<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.snapshot();
        f.debug_struct("SpotlightTour")
            .field("steps", &self.inner.steps.len())
            .field("current", &state.current)
            .field("status", &state.status)
            .field("spot", &state.spot)
            .finish_non_exhaustive()
    }
}

impl<E: 'static> SpotlightTour<E> {
    /// A tour over `steps` with the default configuration.
    pub fn new(steps: Vec<TourStep<E>>) -> Self {
        Self::builder(steps).build()
    }

    pub fn builder(steps: Vec<TourStep<E>>) -> SpotlightTourBuilder<E> {
        SpotlightTourBuilder {
            steps,
            config: TourConfig::default(),
            backdrop: None,
            on_stop: None,
            platform: Platform::current(),
            viewport: Rect::ZERO,
        }
    }

    /// Go to the first step.
    pub fn start(&self) -> LocalBoxFuture<'static, Result<()>> {
        tracing::debug!(message = "tour.start", steps = self.inner.steps.len());
        self.go_to(0)
    }

    /// Go to step `index`. Out-of-range indices are ignored.
    pub fn go_to(&self, index: usize) -> LocalBoxFuture<'static, Result<()>> {
        Rc::clone(&self.inner).go_to(index)
    }

    /// Go to the next step, or stop on the last one.
    pub fn next(&self) -> LocalBoxFuture<'static, Result<()>> {
        Rc::clone(&self.inner).next()
    }

    pub fn previous(&self) -> LocalBoxFuture<'static, Result<()>> {
        Rc::clone(&self.inner).previous()
    }

    pub fn pause(&self) {
        self.inner.pause();
    }

    pub fn resume(&self) {
        self.inner.resume();
    }

    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Report a new highlighted rectangle.
    pub fn change_spot(&self, rect: Rect) {
        self.inner.change_spot(rect);
    }

    /// Fade the tooltip out; resolves once it is hidden.
    pub fn hide_tooltip(&self) -> TooltipHidden {
        let running = self.status() == TourStatus::Running;
        self.inner.overlay.borrow_mut().hide_tooltip(running)
    }

    /// Navigation handle for renderers and callbacks.
    pub fn controls(&self) -> TourControls {
        TourControls(Rc::clone(&self.inner) as Rc<dyn TourDriver>)
    }

    /// Run the backdrop-press behavior of the current step.
    pub fn press_backdrop(&self) -> LocalBoxFuture<'static, Result<()>> {
        let state = self.inner.snapshot();
        let Some(index) = state.current.filter(|_| state.status == TourStatus::Running) else {
            return future::ready(Ok(())).boxed_local();
        };
        let action = self
            .inner
            .steps
            .get(index)
            .and_then(|step| step.backdrop.clone())
            .or_else(|| self.inner.backdrop.clone());

        tracing::debug!(
            message = "tour.backdrop",
            index,
            action = action.as_ref().map_or("none", BackdropAction::as_str)
        );
        match action {
            None => future::ready(Ok(())).boxed_local(),
            Some(BackdropAction::Continue) => self.next(),
            Some(BackdropAction::Stop) => {
                self.stop();
                future::ready(Ok(())).boxed_local()
            }
            Some(BackdropAction::Custom(handler)) => handler(&self.controls()),
        }
    }

    pub(crate) fn anchor_target(&self) -> Rc<dyn AnchorTarget> {
        Rc::clone(&self.inner) as Rc<dyn AnchorTarget>
    }

    /// Produce the scene to paint, or `None` when nothing is shown.
    ///
    /// Nothing is shown unless the tour is running and the spot is
    /// non-empty. The step's render callback runs without any tour borrow
    /// held, so it may call navigation methods.
    pub fn render_overlay(&self) -> Option<OverlayScene<E>> {
        let state = self.inner.snapshot();
        if state.status != TourStatus::Running || state.spot.is_empty() {
            return None;
        }
        let index = state.current?;
        let step = self.inner.steps.get(index)?;
        let config = &self.inner.config;
        let options = config.with_arrow(step.floating.as_ref().unwrap_or(&config.floating));

        let (cutout, cutout_opacity, style, opacity) = {
            let mut overlay = self.inner.overlay.borrow_mut();
            let style = overlay.place_tooltip(&options)?;
            (
                overlay.cutout()?,
                overlay.cutout_opacity(),
                style,
                overlay.tooltip_opacity(),
            )
        };
        let arrow = style.arrow.map(|position| ArrowScene {
            position,
            size: options.arrow_size().unwrap_or_default(),
            color: config.arrow.and_then(|arrow| arrow.color),
        });

        let props = RenderProps::new(index, self.inner.steps.len(), self.controls());
        let content = step.render(&props);
        Some(OverlayScene {
            backdrop: Backdrop {
                color: config.overlay_color,
                opacity: config.overlay_opacity,
            },
            cutout,
            cutout_opacity,
            tooltip: TooltipScene {
                style,
                opacity,
                arrow,
                content,
            },
            native_driver: self.inner.native_driver,
        })
    }
}

impl<E> SpotlightTour<E> {
    pub fn current(&self) -> Option<usize> {
        self.inner.snapshot().current
    }

    pub fn status(&self) -> TourStatus {
        self.inner.snapshot().status
    }

    pub fn spot(&self) -> Rect {
        self.inner.snapshot().spot
    }

    pub fn step_count(&self) -> usize {
        self.inner.steps.len()
    }

    /// Whether a step is active (running or paused).
    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    pub fn config(&self) -> &TourConfig {
        &self.inner.config
    }

    /// Whether a live anchor is mounted for step `index`.
    pub fn has_anchor(&self, index: usize) -> bool {
        self.inner.anchors.is_registered(index)
    }

    /// Advance overlay animations. Frozen while paused.
    pub fn tick(&self, dt: Duration) {
        if self.status() == TourStatus::Paused {
            return;
        }
        self.inner.overlay.borrow_mut().tick(dt);
    }

    /// Jump every running animation to its end.
    pub fn finish_animations(&self) {
        self.inner.overlay.borrow_mut().finish();
    }

    pub fn is_animating(&self) -> bool {
        self.inner.overlay.borrow().is_animating()
    }

    /// Current tooltip opacity, for hosts that paint their own tooltip.
    pub fn tooltip_opacity(&self) -> f64 {
        self.inner.overlay.borrow().tooltip_opacity()
    }

    pub fn set_viewport(&self, viewport: Rect) {
        self.inner.overlay.borrow_mut().set_viewport(viewport);
    }

    /// Report the measured tooltip size so it can be placed.
    pub fn set_tooltip_size(&self, size: Size) {
        self.inner.overlay.borrow_mut().set_tooltip_size(size);
    }

    /// Whether `point` lies inside the highlighted cut-out.
    pub fn hit_cutout(&self, point: Point) -> bool {
        self.status() == TourStatus::Running && self.inner.overlay.borrow().hit_cutout(point)
    }

    /// How many times the tooltip position was actually computed.
    pub fn placement_computations(&self) -> u64 {
        self.inner.overlay.borrow().placement_computations()
    }
}

/// Builder for [`SpotlightTour`].
pub struct SpotlightTourBuilder<E> {
    steps: Vec<TourStep<E>>,
    config: TourConfig,
    backdrop: Option<BackdropAction>,
    on_stop: Option<StopCallback>,
    platform: Platform,
    viewport: Rect,
}

impl<E> fmt::Debug for SpotlightTourBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotlightTourBuilder")
            .field("steps", &self.steps.len())
            .field("config", &self.config)
            .field("backdrop", &self.backdrop)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl<E: 'static> SpotlightTourBuilder<E> {
    #[must_use]
    pub fn config(mut self, config: TourConfig) -> Self {
        self.config = config;
        self
    }

    /// Tour-wide backdrop behavior. Overrides `config.backdrop`.
    #[must_use]
    pub fn on_backdrop_press(mut self, action: impl Into<BackdropAction>) -> Self {
        self.backdrop = Some(action.into());
        self
    }

    #[must_use]
    pub fn on_stop(mut self, callback: impl Fn(StopEvent) + 'static) -> Self {
        self.on_stop = Some(Box::new(callback));
        self
    }

    /// Platform used to resolve the native-driver setting.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn build(self) -> SpotlightTour<E> {
        let backdrop = self
            .backdrop
            .or_else(|| self.config.backdrop.map(BackdropAction::from));
        let native_driver = self.config.native_driver.resolve(self.platform);
        let mut overlay = Overlay::new(&self.config);
        overlay.set_viewport(self.viewport);
        SpotlightTour {
            inner: Rc::new(TourInner {
                steps: self.steps,
                config: self.config,
                backdrop,
                on_stop: self.on_stop,
                native_driver,
                state: RefCell::new(TourState::default()),
                overlay: RefCell::new(overlay),
                anchors: Rc::new(AnchorRegistry::default()),
            }),
        }
    }
}
