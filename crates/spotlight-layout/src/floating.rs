#![forbid(unsafe_code)]

//! Floating-element positioning.
//!
//! [`compute_position`] places a floating box (the tooltip) next to an
//! anchor rectangle (the spot), then runs an ordered middleware list that
//! nudges it to stay inside the viewport:
//!
//! - [`Middleware::Offset`]: push away from the anchor along the main axis.
//! - [`Middleware::Flip`]: if the preferred side overflows, retry on the
//!   opposite side; when neither fits, keep whichever overflows less.
//! - [`Middleware::Shift`]: clamp along the cross axis to the viewport.
//! - [`Middleware::Arrow`]: place an arrow on the edge facing the anchor,
//!   pointing at the anchor's center.
//!
//! Middleware order matters. A flip restarts the pipeline with the new
//! placement, so offset and shift are recomputed for it.
//!
//! # Example
//!
//! ```
//! use spotlight_core::geometry::{Rect, Size};
//! use spotlight_layout::floating::{compute_position, FloatingOptions, Placement};
//!
//! let anchor = Rect::new(100.0, 100.0, 40.0, 20.0);
//! let options = FloatingOptions::new(Placement::BOTTOM).offset(4.0);
//! let style = compute_position(anchor, Size::new(80.0, 30.0), Rect::new(0.0, 0.0, 400.0, 400.0), &options);
//!
//! assert_eq!((style.x, style.y), (80.0, 124.0));
//! ```

use std::fmt;
use std::str::FromStr;

use spotlight_core::geometry::{Point, Rect, Size};

/// Pipeline restarts allowed per computation.
const MAX_RESETS: usize = 8;

/// Side of the anchor the floating box sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// The opposite side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the box sits above or below the anchor.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Alignment along the cross axis. `None` in a [`Placement`] means centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Start,
    End,
}

/// Preferred placement: a side plus an optional alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Placement {
    pub side: Side,
    pub align: Option<Alignment>,
}

impl Default for Placement {
    fn default() -> Self {
        Self::BOTTOM
    }
}

impl Placement {
    pub const TOP: Self = Self::new(Side::Top, None);
    pub const RIGHT: Self = Self::new(Side::Right, None);
    pub const BOTTOM: Self = Self::new(Side::Bottom, None);
    pub const LEFT: Self = Self::new(Side::Left, None);

    pub const fn new(side: Side, align: Option<Alignment>) -> Self {
        Self { side, align }
    }

    /// Align to the start of the cross axis (builder pattern).
    #[must_use]
    pub const fn start(mut self) -> Self {
        self.align = Some(Alignment::Start);
        self
    }

    /// Align to the end of the cross axis (builder pattern).
    #[must_use]
    pub const fn end(mut self) -> Self {
        self.align = Some(Alignment::End);
        self
    }

    /// Same alignment on the opposite side.
    pub const fn flipped(self) -> Self {
        Self::new(self.side.opposite(), self.align)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.side.as_str())?;
        match self.align {
            Some(Alignment::Start) => f.write_str("-start"),
            Some(Alignment::End) => f.write_str("-end"),
            None => Ok(()),
        }
    }
}

/// Error parsing a placement string such as `"bottom-start"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlacementError(String);

impl fmt::Display for ParsePlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid placement: {:?}", self.0)
    }
}

impl std::error::Error for ParsePlacementError {}

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePlacementError(s.to_owned());
        let (side, align) = match s.split_once('-') {
            Some((side, "start")) => (side, Some(Alignment::Start)),
            Some((side, "end")) => (side, Some(Alignment::End)),
            Some(_) => return Err(err()),
            None => (s, None),
        };
        let side = match side {
            "top" => Side::Top,
            "right" => Side::Right,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            _ => return Err(err()),
        };
        Ok(Self::new(side, align))
    }
}

impl TryFrom<String> for Placement {
    type Error = ParsePlacementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Placement> for String {
    fn from(value: Placement) -> Self {
        value.to_string()
    }
}

/// One positioning rule, applied in list order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Middleware {
    /// Gap between anchor and floating box.
    Offset { distance: f64 },
    /// Move to the opposite side when the preferred one overflows.
    Flip { padding: f64 },
    /// Keep the box inside the viewport along the cross axis.
    Shift { padding: f64 },
    /// Position an arrow of `size` at least `padding` from the box corners.
    Arrow { size: f64, padding: f64 },
}

/// Placement plus middleware.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FloatingOptions {
    pub placement: Placement,
    pub middleware: Vec<Middleware>,
}

impl Default for FloatingOptions {
    /// Bottom, offset 4, shift with padding 8, then flip.
    fn default() -> Self {
        Self::new(Placement::BOTTOM).offset(4.0).shift(8.0).flip()
    }
}

impl FloatingOptions {
    /// Bare placement with no middleware.
    #[must_use]
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            middleware: Vec::new(),
        }
    }

    #[must_use]
    pub fn offset(mut self, distance: f64) -> Self {
        self.middleware.push(Middleware::Offset { distance });
        self
    }

    #[must_use]
    pub fn flip(mut self) -> Self {
        self.middleware.push(Middleware::Flip { padding: 0.0 });
        self
    }

    #[must_use]
    pub fn shift(mut self, padding: f64) -> Self {
        self.middleware.push(Middleware::Shift { padding });
        self
    }

    #[must_use]
    pub fn arrow(mut self, size: f64, padding: f64) -> Self {
        self.middleware.push(Middleware::Arrow { size, padding });
        self
    }

    /// Arrow size, if an arrow middleware is present.
    pub fn arrow_size(&self) -> Option<f64> {
        self.middleware.iter().find_map(|m| match m {
            Middleware::Arrow { size, .. } => Some(*size),
            _ => None,
        })
    }
}

/// Where the arrow sits on the floating box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPosition {
    /// Edge of the floating box the arrow sticks out of.
    pub edge: Side,
    /// Offset of the arrow along that edge, from the box's left or top.
    pub offset: f64,
}

/// Computed position of the floating box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingStyle {
    pub x: f64,
    pub y: f64,
    /// Placement after flipping.
    pub placement: Placement,
    pub arrow: Option<ArrowPosition>,
}

impl FloatingStyle {
    /// The floating box rectangle for a given size.
    pub fn rect(&self, size: Size) -> Rect {
        Rect::from_origin_size(Point::new(self.x, self.y), size)
    }
}

/// Position of the box before any middleware.
fn base_coords(anchor: Rect, floating: Size, placement: Placement) -> Point {
    let center = anchor.center();
    let mut p = match placement.side {
        Side::Top => Point::new(center.x - floating.width / 2.0, anchor.top() - floating.height),
        Side::Bottom => Point::new(center.x - floating.width / 2.0, anchor.bottom()),
        Side::Left => Point::new(anchor.left() - floating.width, center.y - floating.height / 2.0),
        Side::Right => Point::new(anchor.right(), center.y - floating.height / 2.0),
    };
    match (placement.side.is_vertical(), placement.align) {
        (true, Some(Alignment::Start)) => p.x = anchor.left(),
        (true, Some(Alignment::End)) => p.x = anchor.right() - floating.width,
        (false, Some(Alignment::Start)) => p.y = anchor.top(),
        (false, Some(Alignment::End)) => p.y = anchor.bottom() - floating.height,
        (_, None) => {}
    }
    p
}

/// How far the box spills past the viewport on its main side (positive = overflow).
fn main_overflow(p: Point, floating: Size, side: Side, viewport: Rect, padding: f64) -> f64 {
    match side {
        Side::Top => viewport.top() + padding - p.y,
        Side::Bottom => p.y + floating.height - (viewport.bottom() - padding),
        Side::Left => viewport.left() + padding - p.x,
        Side::Right => p.x + floating.width - (viewport.right() - padding),
    }
}

/// Clamp `start` so `[start, start + len]` stays in `[lo, hi]`; prefers `lo`
/// when the span does not fit.
fn clamp_span(start: f64, len: f64, lo: f64, hi: f64) -> f64 {
    start.min(hi - len).max(lo)
}

/// Place `floating` next to `anchor` inside `viewport`.
pub fn compute_position(
    anchor: Rect,
    floating: Size,
    viewport: Rect,
    options: &FloatingOptions,
) -> FloatingStyle {
    let mut placement = options.placement;
    let mut tried: Vec<(Placement, f64)> = Vec::new();
    let mut settled = false;
    let mut resets = 0;

    'pipeline: loop {
        let mut p = base_coords(anchor, floating, placement);
        let mut arrow = None;

        for middleware in &options.middleware {
            match *middleware {
                Middleware::Offset { distance } => {
                    p = match placement.side {
                        Side::Top => p.translate(0.0, -distance),
                        Side::Bottom => p.translate(0.0, distance),
                        Side::Left => p.translate(-distance, 0.0),
                        Side::Right => p.translate(distance, 0.0),
                    };
                }
                Middleware::Flip { padding } => {
                    if settled || resets >= MAX_RESETS {
                        continue;
                    }
                    let overflow = main_overflow(p, floating, placement.side, viewport, padding);
                    if overflow <= 0.0 {
                        continue;
                    }
                    tried.push((placement, overflow));
                    let candidates = [options.placement, options.placement.flipped()];
                    let next = candidates
                        .into_iter()
                        .find(|c| !tried.iter().any(|(t, _)| t == c));
                    let next = match next {
                        Some(next) => next,
                        None => {
                            settled = true;
                            tried
                                .iter()
                                .min_by(|a, b| a.1.total_cmp(&b.1))
                                .map_or(placement, |(t, _)| *t)
                        }
                    };
                    if next != placement {
                        placement = next;
                        resets += 1;
                        continue 'pipeline;
                    }
                }
                Middleware::Shift { padding } => {
                    if placement.side.is_vertical() {
                        p.x = clamp_span(
                            p.x,
                            floating.width,
                            viewport.left() + padding,
                            viewport.right() - padding,
                        );
                    } else {
                        p.y = clamp_span(
                            p.y,
                            floating.height,
                            viewport.top() + padding,
                            viewport.bottom() - padding,
                        );
                    }
                }
                Middleware::Arrow { size, padding } => {
                    let center = anchor.center();
                    let (target, len) = if placement.side.is_vertical() {
                        (center.x - p.x, floating.width)
                    } else {
                        (center.y - p.y, floating.height)
                    };
                    let max = (len - size - padding).max(padding);
                    arrow = Some(ArrowPosition {
                        edge: placement.side.opposite(),
                        offset: (target - size / 2.0).clamp(padding, max),
                    });
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "placement.compute",
            placement = %placement,
            x = p.x,
            y = p.y,
            resets
        );

        return FloatingStyle {
            x: p.x,
            y: p.y,
            placement,
            arrow,
        };
    }
}
