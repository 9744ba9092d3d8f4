use nalgebra::{Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f64;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// Which side of the surface a sample is classified on.
///
/// Values **strictly below** zero are "inside" the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    Inside,
    #[default]
    Outside,
}

impl Sign {
    /// Classifies a finite value. Non-finite values are not handled here, see
    /// [`PolygonizeConfig::non_finite`](crate::polygonize::PolygonizeConfig::non_finite).
    #[inline]
    pub fn of(v: Value) -> Self {
        if v < 0.0 { Sign::Inside } else { Sign::Outside }
    }

    #[inline]
    pub fn is_inside(self) -> bool {
        self == Sign::Inside
    }
}
