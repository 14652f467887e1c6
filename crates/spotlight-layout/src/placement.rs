#![forbid(unsafe_code)]

//! Memoized tooltip placement.
//!
//! [`TooltipPlacement`] sits between the overlay and [`compute_position`]. It
//! caches the last result and recomputes only when the anchor, the options,
//! the tooltip size or the viewport changed. While no anchor is present
//! (no active step) nothing is computed at all.

use spotlight_core::geometry::{Rect, Size};

use crate::floating::{FloatingOptions, FloatingStyle, compute_position};

#[derive(Debug, Clone, PartialEq)]
struct PlacementInputs {
    anchor: Rect,
    options: FloatingOptions,
    floating: Size,
    viewport: Rect,
}

/// Cached placement of the tooltip relative to the spot.
#[derive(Debug, Clone, Default)]
pub struct TooltipPlacement {
    last: Option<(PlacementInputs, FloatingStyle)>,
    computations: u64,
}

impl TooltipPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style for the given inputs, recomputed only if they changed.
    ///
    /// Returns `None` without computing when `anchor` is `None`.
    pub fn update(
        &mut self,
        anchor: Option<Rect>,
        options: &FloatingOptions,
        floating: Size,
        viewport: Rect,
    ) -> Option<FloatingStyle> {
        let anchor = anchor?;

        if let Some((inputs, style)) = &self.last
            && inputs.anchor == anchor
            && inputs.floating == floating
            && inputs.viewport == viewport
            && inputs.options == *options
        {
            return Some(*style);
        }

        let style = compute_position(anchor, floating, viewport, options);
        self.computations += 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "placement.compute",
            placement = %style.placement,
            x = style.x,
            y = style.y,
            computations = self.computations
        );

        self.last = Some((
            PlacementInputs {
                anchor,
                options: options.clone(),
                floating,
                viewport,
            },
            style,
        ));
        Some(style)
    }

    /// Last computed style, if any.
    pub fn style(&self) -> Option<FloatingStyle> {
        self.last.as_ref().map(|(_, style)| *style)
    }

    /// How many times the style was actually computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drop the cached result so the next update recomputes.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
