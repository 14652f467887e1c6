#![forbid(unsafe_code)]

//! Tooltip placement for spotlight tours.
//!
//! - [`floating`]: floating-ui style positioning with ordered middleware.
//! - [`placement`]: the memoized adapter the overlay calls every frame.

pub mod floating;
pub mod placement;

pub use floating::{
    Alignment, ArrowPosition, FloatingOptions, FloatingStyle, Middleware, Placement, Side,
    compute_position,
};
pub use placement::TooltipPlacement;
