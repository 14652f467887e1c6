#![forbid(unsafe_code)]

//! Shared animated values.
//!
//! An [`AnimatedValue`] is a cheaply clonable handle to one scalar. The
//! overlay holds one handle per channel and the running animation holds
//! another, so the animation writes while the renderer reads. Handles are
//! `!Send`: animation is driven from the single UI thread.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::geometry::Point;

/// A shared, mutable scalar driven by animations.
#[derive(Clone, Default)]
pub struct AnimatedValue(Rc<Cell<f64>>);

impl AnimatedValue {
    /// Create a value holding `initial`.
    #[must_use]
    pub fn new(initial: f64) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Overwrite the current value.
    #[inline]
    pub fn set(&self, value: f64) {
        self.0.set(value);
    }
}

impl fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnimatedValue").field(&self.get()).finish()
    }
}

/// A pair of animated values, animated as a 2-D vector.
#[derive(Debug, Clone, Default)]
pub struct AnimatedPoint {
    pub x: AnimatedValue,
    pub y: AnimatedValue,
}

impl AnimatedPoint {
    /// Create a point holding `initial`.
    #[must_use]
    pub fn new(initial: Point) -> Self {
        Self {
            x: AnimatedValue::new(initial.x),
            y: AnimatedValue::new(initial.y),
        }
    }

    /// Current value.
    pub fn get(&self) -> Point {
        Point::new(self.x.get(), self.y.get())
    }

    /// Overwrite both components.
    pub fn set(&self, point: Point) {
        self.x.set(point.x);
        self.y.set(point.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let a = AnimatedValue::new(1.0);
        let b = a.clone();
        b.set(5.0);
        assert_eq!(a.get(), 5.0);
        let other = AnimatedValue::new(1.0);
        other.set(7.0);
        assert_eq!(a.get(), 5.0);
    }

    #[test]
    fn point_round_trip() {
        let p = AnimatedPoint::new(Point::new(1.0, 2.0));
        p.set(Point::new(3.0, 4.0));
        assert_eq!(p.get(), Point::new(3.0, 4.0));
    }
}
