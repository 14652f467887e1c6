#![forbid(unsafe_code)]

//! Highlight shapes enclosing a target rectangle.
//!
//! Pure geometry: given the measured spot and a padding, compute the circle
//! or rounded rectangle that the overlay cuts out of the backdrop. The
//! motion engine animates between two shapes through their
//! [`channels`](ShapeGeometry::channels).
//!
//! # Invariants
//!
//! 1. Circle: center = target centroid, radius = max(w, h) / 2 + padding.
//! 2. Rectangle: target inflated by `padding` on every edge, corner radius
//!    [`RECT_CORNER_RADIUS`].
//! 3. `ShapeGeometry::from_channels(g.shape(), g.channels())` rebuilds `g`.

use crate::geometry::{Point, Rect, Size};

/// Default breathing room between the target and the highlight edge.
pub const DEFAULT_PADDING: f64 = 16.0;

/// Corner rounding of the rectangle shape.
pub const RECT_CORNER_RADIUS: f64 = 4.0;

/// Highlight shape kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Shape {
    #[default]
    Circle,
    Rectangle,
}

impl Shape {
    /// Compute this shape around `target` with `padding`.
    pub fn enclose(self, target: Rect, padding: f64) -> ShapeGeometry {
        match self {
            Self::Circle => ShapeGeometry::Circle {
                center: target.center(),
                radius: target.width.max(target.height) / 2.0 + padding,
            },
            Self::Rectangle => {
                let inflated = target.inflate(padding);
                ShapeGeometry::Rectangle {
                    origin: inflated.origin(),
                    size: inflated.size(),
                    corner_radius: RECT_CORNER_RADIUS,
                }
            }
        }
    }

    /// Lowercase name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
        }
    }
}

/// Shape kind plus padding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShapeOptions {
    pub shape: Shape,
    pub padding: f64,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            shape: Shape::Circle,
            padding: DEFAULT_PADDING,
        }
    }
}

impl ShapeOptions {
    /// Circle with default padding.
    pub const fn circle() -> Self {
        Self {
            shape: Shape::Circle,
            padding: DEFAULT_PADDING,
        }
    }

    /// Rectangle with default padding.
    pub const fn rectangle() -> Self {
        Self {
            shape: Shape::Rectangle,
            padding: DEFAULT_PADDING,
        }
    }

    /// Set padding (builder pattern).
    #[must_use]
    pub const fn padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Compute the highlight geometry for `target`.
    pub fn geometry(&self, target: Rect) -> ShapeGeometry {
        self.shape.enclose(target, self.padding)
    }
}

impl From<Shape> for ShapeOptions {
    fn from(shape: Shape) -> Self {
        Self {
            shape,
            padding: DEFAULT_PADDING,
        }
    }
}

/// Concrete highlight geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    Circle {
        center: Point,
        radius: f64,
    },
    Rectangle {
        origin: Point,
        size: Size,
        corner_radius: f64,
    },
}

impl ShapeGeometry {
    /// A degenerate shape of the given kind at the origin.
    pub const fn empty(shape: Shape) -> Self {
        match shape {
            Shape::Circle => Self::Circle {
                center: Point::ZERO,
                radius: 0.0,
            },
            Shape::Rectangle => Self::Rectangle {
                origin: Point::ZERO,
                size: Size::ZERO,
                corner_radius: RECT_CORNER_RADIUS,
            },
        }
    }

    /// Shape kind.
    pub const fn shape(&self) -> Shape {
        match self {
            Self::Circle { .. } => Shape::Circle,
            Self::Rectangle { .. } => Shape::Rectangle,
        }
    }

    /// The two interpolation vectors: `(center, (r, r))` for a circle and
    /// `(origin, (w, h))` for a rectangle.
    pub fn channels(&self) -> (Point, Point) {
        match *self {
            Self::Circle { center, radius } => (center, Point::new(radius, radius)),
            Self::Rectangle { origin, size, .. } => {
                (origin, Point::new(size.width, size.height))
            }
        }
    }

    /// Rebuild a geometry from animated channel values.
    pub fn from_channels(shape: Shape, position: Point, extent: Point) -> Self {
        match shape {
            Shape::Circle => Self::Circle {
                center: position,
                radius: extent.x.max(0.0),
            },
            Shape::Rectangle => Self::Rectangle {
                origin: position,
                size: Size::new(extent.x.max(0.0), extent.y.max(0.0)),
                corner_radius: RECT_CORNER_RADIUS,
            },
        }
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            Self::Rectangle { origin, size, .. } => Rect::from_origin_size(origin, size),
        }
    }

    /// Whether the shape has no visible area.
    pub fn is_empty(&self) -> bool {
        match *self {
            Self::Circle { radius, .. } => radius <= 0.0,
            Self::Rectangle { size, .. } => size.is_empty(),
        }
    }

    /// Hit test against the cut-out (corner rounding ignored).
    pub fn contains(&self, point: Point) -> bool {
        match *self {
            Self::Circle { center, radius } => {
                let dx = point.x - center.x;
                let dy = point.y - center.y;
                dx * dx + dy * dy <= radius * radius
            }
            Self::Rectangle { origin, size, .. } => {
                Rect::from_origin_size(origin, size).contains(point)
            }
        }
    }
}
