//! Node variants of an [`ImplicitTree`](crate::tree::ImplicitTree) and the
//! closed-form field of every primitive.

use nalgebra::Vector2;

use crate::{
    tree::NodeId,
    types::{Point, Value, Vector},
};

/// One node of an implicit tree.
///
/// Primitives carry their parameters inline. Combinators and transforms refer
/// to their children by [`NodeId`] in the owning tree's arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `|p - center|² - radius²`. Sign-correct, but not a distance.
    Sphere { center: Point, radius: Value },

    /// Exact signed distance to an axis-aligned box.
    ExactBox { center: Point, half_extents: Vector },

    /// Maximum of the six signed face-plane distances of an axis-aligned box.
    ///
    /// Agrees in sign with [`Node::ExactBox`], but underestimates the distance
    /// near edges and corners outside the box.
    FaceDistanceBox { center: Point, half_extents: Vector },

    /// Segment of length `2 * half_length` through `origin` along the unit
    /// `direction`, thickened by `radius`.
    Capsule {
        origin: Point,
        direction: Vector,
        half_length: Value,
        radius: Value,
    },

    /// Ring of radius `major` in the XZ plane around the Y axis, with tube radius `minor`.
    Torus {
        center: Point,
        major: Value,
        minor: Value,
    },

    Union(NodeId, NodeId),
    Intersection(NodeId, NodeId),
    /// First operand minus the second.
    Difference(NodeId, NodeId),

    /// Smooth union with a cubic blend of the given `width`.
    Blend { a: NodeId, b: NodeId, width: Value },

    /// Infinite tiling of `child` with period `2 * half_period` on each axis.
    Replicate { child: NodeId, half_period: Vector },

    Translate { child: NodeId, offset: Vector },
    Scale { child: NodeId, factor: Vector },
}

impl Node {
    /// Returns the children of this node, first operand first.
    pub fn children(&self) -> [Option<NodeId>; 2] {
        match *self {
            Node::Sphere { .. }
            | Node::ExactBox { .. }
            | Node::FaceDistanceBox { .. }
            | Node::Capsule { .. }
            | Node::Torus { .. } => [None, None],
            Node::Union(a, b)
            | Node::Intersection(a, b)
            | Node::Difference(a, b)
            | Node::Blend { a, b, .. } => [Some(a), Some(b)],
            Node::Replicate { child, .. }
            | Node::Translate { child, .. }
            | Node::Scale { child, .. } => [Some(child), None],
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.children() == [None, None]
    }

    /// Evaluates this node at `p` as far as it can without its children.
    pub fn step(&self, p: &Point) -> Step {
        match self {
            Node::Sphere { center, radius } => Step::Value(sphere(p, center, *radius)),
            Node::ExactBox {
                center,
                half_extents,
            } => Step::Value(exact_box(p, center, half_extents)),
            Node::FaceDistanceBox {
                center,
                half_extents,
            } => Step::Value(face_distance_box(p, center, half_extents)),
            Node::Capsule {
                origin,
                direction,
                half_length,
                radius,
            } => Step::Value(capsule(p, origin, direction, *half_length, *radius)),
            Node::Torus {
                center,
                major,
                minor,
            } => Step::Value(torus(p, center, *major, *minor)),
            Node::Union(a, b) => Step::Pair(*a, *b, Combine::Min),
            Node::Intersection(a, b) => Step::Pair(*a, *b, Combine::Max),
            Node::Difference(a, b) => Step::Pair(*a, *b, Combine::Subtract),
            Node::Blend { a, b, width } => Step::Pair(*a, *b, Combine::Blend(*width)),
            Node::Replicate { child, half_period } => {
                Step::Child(*child, replicate(p, half_period))
            }
            Node::Translate { child, offset } => Step::Child(*child, p - offset),
            Node::Scale { child, factor } => Step::Child(*child, scale(p, factor)),
        }
    }
}

/// Result of [`Node::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Field value of a primitive.
    Value(Value),
    /// Value of the child evaluated at the transformed point.
    Child(NodeId, Point),
    /// Both operands evaluated at the same point, then combined.
    Pair(NodeId, NodeId, Combine),
}

/// How a binary node merges the values of its operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Combine {
    Min,
    Max,
    /// `max(a, -b)`
    Subtract,
    Blend(Value),
}

impl Combine {
    #[inline]
    pub fn apply(self, a: Value, b: Value) -> Value {
        match self {
            Combine::Min => a.min(b),
            Combine::Max => a.max(b),
            Combine::Subtract => a.max(-b),
            Combine::Blend(width) => blend(a, b, width),
        }
    }
}

#[inline]
pub fn sphere(p: &Point, center: &Point, radius: Value) -> Value {
    (p - center).norm_squared() - radius * radius
}

/// Exact box distance, folding the point into the positive octant:
///
/// ```text
/// q = |p - center| - half_extents
/// d = |max(q, 0)| + min(max(qx, qy, qz), 0)
/// ```
#[inline]
pub fn exact_box(p: &Point, center: &Point, half_extents: &Vector) -> Value {
    let q = (p - center).abs() - half_extents;
    q.sup(&Vector::zeros()).norm() + q.max().min(0.0)
}

#[inline]
pub fn face_distance_box(p: &Point, center: &Point, half_extents: &Vector) -> Value {
    let rel = p - center;
    let mut max = Value::NEG_INFINITY;
    for axis in 0..3 {
        for side in [-1.0, 1.0] {
            let normal = Vector::ith(axis, side);
            let face = normal * half_extents[axis];
            max = max.max((rel - face).dot(&normal));
        }
    }
    max
}

#[inline]
pub fn capsule(
    p: &Point,
    origin: &Point,
    direction: &Vector,
    half_length: Value,
    radius: Value,
) -> Value {
    let rel = p - origin;
    let d = direction.dot(&rel).clamp(-half_length, half_length);
    (rel - direction * d).norm() - radius
}

#[inline]
pub fn torus(p: &Point, center: &Point, major: Value, minor: Value) -> Value {
    let rel = p - center;
    let ring = Vector2::new(rel.x, rel.z).norm() - major;
    Vector2::new(ring, rel.y).norm() - minor
}

/// Polynomial smooth minimum:
///
/// ```text
/// h = max(0, k - |a - b|) / k
/// d = min(a, b) - k/6 * h³
/// ```
///
/// `width` must be positive.
#[inline]
pub fn blend(a: Value, b: Value, width: Value) -> Value {
    let h = (width - (a - b).abs()).max(0.0) / width;
    a.min(b) - (width / 6.0) * h * h * h
}

/// Folds `p` into the cell `[-half_period, half_period)` around the origin.
///
/// Uses the Euclidean remainder so the tiling stays periodic for negative
/// coordinates.
#[inline]
pub fn replicate(p: &Point, half_period: &Vector) -> Point {
    Point::from(
        p.coords
            .zip_map(half_period, |c, h| (c + h).rem_euclid(2.0 * h) - h),
    )
}

#[inline]
pub fn scale(p: &Point, factor: &Vector) -> Point {
    Point::from(p.coords.component_div(factor))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn boxes_agree_inside_and_on_faces() {
        let c = Point::new(1.0, 2.0, 3.0);
        let h = Vector::new(1.0, 2.0, 0.5);
        for p in [
            Point::new(1.0, 2.0, 3.0),
            Point::new(1.5, 1.0, 3.2),
            Point::new(2.0, 2.0, 3.0),
            Point::new(4.0, 2.0, 3.0),
        ] {
            assert_abs_diff_eq!(exact_box(&p, &c, &h), face_distance_box(&p, &c, &h), epsilon = 1e-12);
        }
    }

    #[test]
    fn boxes_differ_outside_corners() {
        let h = Vector::new(1.0, 1.0, 1.0);
        let p = Point::new(2.0, 2.0, 2.0);
        let exact = exact_box(&p, &Point::origin(), &h);
        let faces = face_distance_box(&p, &Point::origin(), &h);
        assert_abs_diff_eq!(exact, 3.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(faces, 1.0, epsilon = 1e-12);
        assert!(exact > 0.0 && faces > 0.0);
    }

    #[test]
    fn capsule_clamps_to_segment_ends() {
        let dir = Vector::z();
        // Beside the segment.
        assert_abs_diff_eq!(
            capsule(&Point::new(2.0, 0.0, 0.5), &Point::origin(), &dir, 1.0, 0.5),
            1.5,
            epsilon = 1e-12
        );
        // Past the end cap.
        assert_abs_diff_eq!(
            capsule(&Point::new(0.0, 0.0, 3.0), &Point::origin(), &dir, 1.0, 0.5),
            1.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn torus_is_zero_on_tube_surface() {
        let c = Point::origin();
        assert_abs_diff_eq!(torus(&Point::new(13.0, 0.0, 0.0), &c, 10.0, 3.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(torus(&Point::new(0.0, 3.0, 10.0), &c, 10.0, 3.0), 0.0, epsilon = 1e-12);
        assert!(torus(&Point::new(10.0, 0.0, 0.0), &c, 10.0, 3.0) < 0.0);
        assert!(torus(&Point::origin(), &c, 10.0, 3.0) > 0.0);
    }

    #[test]
    fn blend_equals_min_far_from_the_seam() {
        assert_eq!(blend(-2.0, 5.0, 1.0), -2.0);
        // On the seam the blend digs k/6 below both operands.
        assert_abs_diff_eq!(blend(1.0, 1.0, 0.6), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn replicate_folds_negative_coordinates() {
        let h = Vector::new(2.0, 2.0, 2.0);
        let folded = replicate(&Point::new(-3.0, 5.0, 0.5), &h);
        assert_abs_diff_eq!(folded.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(folded.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(folded.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn primitives_have_no_children() {
        let node = Node::Sphere {
            center: Point::origin(),
            radius: 1.0,
        };
        assert!(node.is_primitive());
    }
}
