use crate::types::{Point, Value};

// Return the interpolation factor t corresponding to iso_val
pub fn find_t(v0: Value, v1: Value, iso_val: Value) -> Value {
    (iso_val - v0) / (v1 - v0)
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

// Linearly interpolate between two points by factor t
pub fn interpolate_points(p0: &Point, p1: &Point, t: Value) -> Point {
    Point::from(p0.coords.zip_map(&p1.coords, |a, b| lerp(a, b, t)))
}

/// First guess for the zero crossing between `p0` (value `v0`) and `p1`
/// (value `v1`).
///
/// Falls back to the midpoint when the linear estimate is not usable
/// (equal or non-finite values).
pub fn crossing_seed(p0: &Point, v0: Value, p1: &Point, v1: Value) -> Point {
    let t = find_t(v0, v1, 0.0);
    if v0.is_finite() && v1.is_finite() && (0.0..=1.0).contains(&t) {
        interpolate_points(p0, p1, t)
    } else {
        interpolate_points(p0, p1, 0.5)
    }
}
