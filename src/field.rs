use crate::{
    domain::Aabb,
    error::Result,
    mesh::Mesh,
    polygonize::{PolygonizeConfig, polygonize_with},
    types::{Point, Value, Vector},
};

/// Step used for the central differences of [`ScalarField::gradient`] by the
/// polygonizer unless configured otherwise.
pub const DEFAULT_GRADIENT_STEP: Value = 1.0e-4;

/// A scalar field: maps a [`Point`] to a [`Value`].
///
/// Negative values are inside the solid, positive values outside and the
/// surface is the zero level-set. Implementations must be pure, the
/// polygonizer calls [`value`](ScalarField::value) millions of times per run.
///
/// Any `Fn(&Point) -> Value` closure is a scalar field.
pub trait ScalarField {
    fn value(&self, p: &Point) -> Value;

    /// Gradient by central finite differences with step `step` on each axis.
    fn gradient(&self, p: &Point, step: Value) -> Vector {
        let mut g = Vector::zeros();
        for axis in 0..3 {
            let h = Vector::ith(axis, step);
            g[axis] = (self.value(&(p + h)) - self.value(&(p - h))) / (2.0 * step);
        }
        g
    }

    /// Unit surface normal, i.e. the normalized [`gradient`](ScalarField::gradient).
    ///
    /// Returns the zero vector where the gradient vanishes or is not finite.
    fn normal(&self, p: &Point, step: Value) -> Vector {
        let g = self.gradient(p, step);
        let n = g.norm();
        if !n.is_finite() || n < Value::EPSILON {
            Vector::zeros()
        } else {
            g / n
        }
    }

    /// Polygonizes the field inside `domain` with `resolution` samples per
    /// axis, replacing the contents of `out`.
    ///
    /// `epsilon` is the dichotomy tolerance used to place vertices on the
    /// surface. See [`polygonize_with`] for the full set of options.
    fn polygonize(
        &self,
        resolution: usize,
        out: &mut Mesh,
        domain: &Aabb,
        epsilon: Value,
    ) -> Result<()> {
        let config = PolygonizeConfig::default().with_epsilon(epsilon);
        polygonize_with(self, resolution, out, domain, &config)
    }
}

impl<F> ScalarField for F
where
    F: Fn(&Point) -> Value,
{
    #[inline]
    fn value(&self, p: &Point) -> Value {
        self(p)
    }
}
