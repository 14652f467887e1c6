#![forbid(unsafe_code)]

//! Spotlight: guided product tours over an existing UI.
//!
//! A tour walks the user through a list of steps. For each step a "spotlight"
//! cut-out highlights one element of the host screen while the rest is dimmed
//! by a backdrop, and a tooltip explains it.
//!
//! This crate owns the tour state machine, the anchor registry and the
//! overlay scene. The host owns rendering: it mounts anchors with
//! [`AttachStep`], calls [`SpotlightTour::tick`] from its frame clock and
//! paints whatever [`SpotlightTour::render_overlay`] returns.
//!
//! ```
//! use futures_util::FutureExt;
//! use spotlight::prelude::*;
//!
//! let tour = SpotlightTour::builder(vec![
//!     TourStep::new(|_| "Search lives here"),
//!     TourStep::new(|_| "And your profile here").shape(Shape::Rectangle),
//! ])
//! .config(TourConfig::default().motion(Motion::Slide))
//! .on_backdrop_press(BackdropAction::Continue)
//! .build();
//!
//! tour.start().now_or_never();
//! tour.change_spot(Rect::new(10.0, 20.0, 100.0, 40.0));
//! let scene = tour.render_overlay().unwrap();
//! assert_eq!(scene.tooltip.content, "Search lives here");
//! ```

// --- Modules ---------------------------------------------------------------

pub mod attach;
pub mod config;
pub mod error;
pub mod overlay;
pub mod step;
pub mod tooltip;
pub mod tour;

// --- Re-exports ------------------------------------------------------------

pub use attach::{AnchorHost, AnchorRegistration, AttachStep, ContainerLayout, Measure};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::{ArrowOptions, BackdropBehavior, NativeDriver, Platform, TooltipFade, TourConfig};
pub use error::{HookError, Result, TourError};
pub use overlay::{
    ArrowScene, Backdrop, BackdropAction, OverlayScene, TooltipHidden, TooltipScene,
};
pub use step::TourStep;
pub use tour::{
    RenderProps, SpotlightTour, SpotlightTourBuilder, StopEvent, TourControls, TourStatus,
};

pub use spotlight_core as core;
pub use spotlight_layout as layout;

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AttachStep, BackdropAction, OverlayScene, RenderProps, SpotlightTour, StopEvent,
        TourConfig, TourControls, TourError, TourStatus, TourStep,
    };

    pub use spotlight_core::{Motion, Point, Rect, Shape, ShapeOptions, Size};
    pub use spotlight_layout::{FloatingOptions, Placement};
}
