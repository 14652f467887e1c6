#![forbid(unsafe_code)]

//! Core: geometry, highlight shapes, and motion for spotlight tours.
//!
//! # Role in spotlight
//! `spotlight-core` is the pure layer. It knows nothing about steps, hosts or
//! tooltips; it turns a measured rectangle into a highlight shape and drives
//! the animated values that move the highlight between shapes.
//!
//! # Primary responsibilities
//! - **Geometry**: `Point`, `Size`, `Rect` in window coordinates.
//! - **Shape**: circle or rounded rectangle enclosing a target plus padding.
//! - **Animation**: springs, eased timings, shared animated values.
//! - **Motion**: bounce / fade / slide strategies composed into plans.
//! - **Color**: RGBA values for the backdrop and tooltip styling.
//!
//! # How it fits in the system
//! `spotlight-layout` positions the tooltip around the shape's target and
//! the `spotlight` crate owns the tour state machine and the overlay that
//! ticks motion plans every frame.

pub mod animation;
pub mod color;
pub mod geometry;
pub mod motion;
pub mod shape;

pub use color::Rgba;
pub use geometry::{Point, Rect, Size};
pub use motion::{Motion, MotionPlan, MotionTiming, MotionValues};
pub use shape::{Shape, ShapeGeometry, ShapeOptions};
