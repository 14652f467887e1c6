#![forbid(unsafe_code)]

//! Tour step definitions.
//!
//! A [`TourStep`] is immutable once handed to the tour and is identified only
//! by its index. Every override is optional; `None` means "use the tour
//! default". Overrides replace the default wholesale, they are never merged.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use spotlight_core::geometry::Rect;
use spotlight_core::motion::Motion;
use spotlight_core::shape::ShapeOptions;
use spotlight_layout::floating::FloatingOptions;

use crate::error::HookError;
use crate::overlay::BackdropAction;
use crate::tour::RenderProps;

/// Hook run before a step is revealed.
///
/// Receives the step anchor's rectangle when that anchor is mounted and
/// measurable. The tour waits for the returned future; an error aborts the
/// transition.
pub type BeforeHook = Rc<dyn Fn(Option<Rect>) -> LocalBoxFuture<'static, Result<(), HookError>>>;

/// Produces the tooltip content of a step.
pub type RenderFn<E> = Rc<dyn Fn(&RenderProps) -> E>;

/// One stage of a tour.
pub struct TourStep<E> {
    pub(crate) render: RenderFn<E>,
    pub(crate) before: Option<BeforeHook>,
    pub(crate) motion: Option<Motion>,
    pub(crate) shape: Option<ShapeOptions>,
    pub(crate) floating: Option<FloatingOptions>,
    pub(crate) backdrop: Option<BackdropAction>,
}

impl<E> Clone for TourStep<E> {
    fn clone(&self) -> Self {
        Self {
            render: Rc::clone(&self.render),
            before: self.before.clone(),
            motion: self.motion,
            shape: self.shape,
            floating: self.floating.clone(),
            backdrop: self.backdrop.clone(),
        }
    }
}

impl<E> fmt::Debug for TourStep<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourStep")
            .field("before", &self.before.is_some())
            .field("motion", &self.motion)
            .field("shape", &self.shape)
            .field("floating", &self.floating)
            .field("backdrop", &self.backdrop)
            .finish_non_exhaustive()
    }
}

impl<E> TourStep<E> {
    /// A step rendering its tooltip with `render`.
    pub fn new(render: impl Fn(&RenderProps) -> E + 'static) -> Self {
        Self {
            render: Rc::new(render),
            before: None,
            motion: None,
            shape: None,
            floating: None,
            backdrop: None,
        }
    }

    /// Synchronous `before` hook.
    #[must_use]
    pub fn before(
        mut self,
        hook: impl Fn(Option<Rect>) -> Result<(), HookError> + 'static,
    ) -> Self {
        self.before = Some(Rc::new(move |anchor| future::ready(hook(anchor)).boxed_local()));
        self
    }

    /// Asynchronous `before` hook.
    #[must_use]
    pub fn before_async<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Rect>) -> Fut + 'static,
        Fut: Future<Output = Result<(), HookError>> + 'static,
    {
        self.before = Some(Rc::new(move |anchor| hook(anchor).boxed_local()));
        self
    }

    #[must_use]
    pub fn motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    #[must_use]
    pub fn shape(mut self, shape: impl Into<ShapeOptions>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Placement and middleware for this step's tooltip.
    #[must_use]
    pub fn floating(mut self, floating: FloatingOptions) -> Self {
        self.floating = Some(floating);
        self
    }

    #[must_use]
    pub fn on_backdrop_press(mut self, action: impl Into<BackdropAction>) -> Self {
        self.backdrop = Some(action.into());
        self
    }

    /// Render the tooltip content.
    pub fn render(&self, props: &RenderProps) -> E {
        (self.render)(props)
    }

    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }
}
