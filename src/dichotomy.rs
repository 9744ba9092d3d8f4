use crate::{
    error::{ImplicitError, Result},
    field::ScalarField,
    interp::crossing_seed,
    types::{Point, Sign, Value},
};

/// Bisection refiner locating the zero crossing of a field on a segment.
///
/// The first probe is the linear estimate between the endpoints, every later
/// probe the midpoint of the current bracket. Refinement stops as soon as a
/// probe evaluates within `tolerance` of zero, or after `max_depth` probes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dichotomy {
    pub tolerance: Value,
    pub max_depth: u32,
    /// Side assigned to probes where the field is not finite.
    pub non_finite: Sign,
}

impl Dichotomy {
    pub fn new(tolerance: Value, max_depth: u32) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ImplicitError::InvalidTolerance(tolerance));
        }
        Ok(Self {
            tolerance,
            max_depth,
            non_finite: Sign::default(),
        })
    }

    /// Refiner for segments of length `length`: enough probes to halve the
    /// bracket below `tolerance` even if no probe lands within tolerance of
    /// the surface.
    pub fn for_segment(length: Value, tolerance: Value) -> Result<Self> {
        let mut dichotomy = Self::new(tolerance, 1)?;
        if length.is_finite() && length > tolerance {
            dichotomy.max_depth = (length / tolerance).log2().ceil() as u32 + 1;
        }
        Ok(dichotomy)
    }

    pub fn with_non_finite(mut self, sign: Sign) -> Self {
        self.non_finite = sign;
        self
    }

    /// Inside/outside classification shared with the cube configuration.
    #[inline]
    pub fn classify(&self, v: Value) -> Sign {
        if v.is_finite() { Sign::of(v) } else { self.non_finite }
    }

    /// Locates the crossing between `a` (value `va`) and `b` (value `vb`).
    ///
    /// The result always lies on the segment `a-b`. When `va` and `vb` are
    /// classified on the same side it converges towards `b`.
    pub fn refine<F>(&self, field: &F, mut a: Point, va: Value, mut b: Point, vb: Value) -> Point
    where
        F: ScalarField + ?Sized,
    {
        let side_a = self.classify(va);
        let mut probe = crossing_seed(&a, va, &b, vb);

        for _ in 0..self.max_depth {
            let v = field.value(&probe);
            if v.abs() < self.tolerance {
                break;
            }
            if self.classify(v) == side_a {
                a = probe;
            } else {
                b = probe;
            }
            probe = nalgebra::center(&a, &b);
        }

        probe
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn plane(p: &Point) -> Value {
        p.x - 0.3
    }

    #[test]
    fn linear_seed_hits_a_plane_immediately() {
        let d = Dichotomy::new(1e-9, 1).unwrap();
        let p = d.refine(&plane, Point::origin(), -0.3, Point::new(1.0, 0.0, 0.0), 0.7);
        assert_abs_diff_eq!(p.x, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn zero_depth_returns_the_seed() {
        let d = Dichotomy::new(1e-9, 0).unwrap();
        let sphere = |p: &Point| p.coords.norm_squared() - 1.0;
        let p = d.refine(&sphere, Point::origin(), -1.0, Point::new(2.0, 0.0, 0.0), 3.0);
        assert_abs_diff_eq!(p.x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn depth_follows_segment_length() {
        assert_eq!(Dichotomy::for_segment(1.0, 0.25).unwrap().max_depth, 3);
        assert_eq!(Dichotomy::for_segment(0.1, 0.25).unwrap().max_depth, 1);
        assert!(Dichotomy::for_segment(1.0, 0.0).is_err());
    }

    #[test]
    fn non_finite_probes_follow_the_policy() {
        // Field is undefined beyond x = 0.5, classified as inside there.
        let field = |p: &Point| if p.x > 0.5 { Value::NAN } else { 1.0 - p.x };
        let d = Dichotomy::new(1e-6, 40)
            .unwrap()
            .with_non_finite(Sign::Inside);
        let p = d.refine(&field, Point::origin(), 1.0, Point::new(1.0, 0.0, 0.0), Value::NAN);
        assert_abs_diff_eq!(p.x, 0.5, epsilon = 1e-6);
    }
}
