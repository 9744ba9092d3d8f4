use crate::types::{Point, Value, Vector};

/// Axis-aligned region sampled by the polygonizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Cube centered on the origin, `[-half_extent, half_extent]` on every axis.
    pub fn cube(half_extent: Value) -> Self {
        let h = Vector::repeat(half_extent);
        Self::new(Point::from(-h), Point::from(h))
    }

    /// Returns the box of size `dims` centered on `center`.
    ///
    /// ```text
    ///  min = center - dims/2
    ///  max = center + dims/2
    /// ```
    pub fn from_center(center: Point, dims: Vector) -> Self {
        Self::new(center - dims / 2.0, center + dims / 2.0)
    }

    pub fn diagonal(&self) -> Vector {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn contains(&self, p: &Point) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// True when some axis has no positive, finite extent.
    pub fn is_degenerate(&self) -> bool {
        self.diagonal().iter().any(|d| !d.is_finite() || *d <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_is_centered() {
        let b = Aabb::cube(2.0);
        assert_eq!(b.center(), Point::origin());
        assert_eq!(b.diagonal(), Vector::repeat(4.0));
        assert!(b.contains(&Point::new(2.0, -2.0, 0.0)));
        assert!(!b.contains(&Point::new(2.1, 0.0, 0.0)));
    }

    #[test]
    fn flat_boxes_are_degenerate() {
        assert!(Aabb::cube(0.0).is_degenerate());
        assert!(Aabb::new(Point::origin(), Point::new(1.0, 0.0, 1.0)).is_degenerate());
        assert!(Aabb::cube(Value::NAN).is_degenerate());
        assert!(!Aabb::from_center(Point::new(1.0, 1.0, 1.0), Vector::repeat(0.5)).is_degenerate());
    }
}
