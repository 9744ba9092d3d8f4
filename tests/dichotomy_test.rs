use approx::assert_abs_diff_eq;
use implicit_mc::{
    Dichotomy, ImplicitTree, ScalarField,
    types::{Point, Sign, Value, Vector},
};

fn torus() -> ImplicitTree {
    let mut tree = ImplicitTree::new();
    let t = tree.torus(Point::origin(), 2.0, 0.5).unwrap();
    tree.set_root(t).unwrap();
    tree
}

#[test]
fn refined_point_is_within_tolerance() {
    let field = torus();
    let a = Point::new(2.0, 0.0, 0.0);
    let b = Point::new(3.2, 0.4, 0.1);
    let (va, vb) = (field.value(&a), field.value(&b));
    assert!(va < 0.0 && vb > 0.0);

    let d = Dichotomy::for_segment((b - a).norm(), 1e-8).unwrap();
    let p = d.refine(&field, a, va, b, vb);
    assert!(field.value(&p).abs() < 1e-7);

    // On the segment a-b.
    let t = (p - a).dot(&(b - a)) / (b - a).norm_squared();
    assert!((0.0..=1.0).contains(&t));
    assert_abs_diff_eq!((a + (b - a) * t - p).norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn deep_refinement_meets_the_value_tolerance() {
    let field = torus();
    let a = Point::new(0.0, 0.2, 2.1);
    let b = Point::new(0.0, 1.0, 3.0);
    let (va, vb) = (field.value(&a), field.value(&b));
    assert!(va < 0.0 && vb > 0.0);

    let d = Dichotomy::new(1e-8, 200).unwrap();
    let p = d.refine(&field, a, va, b, vb);
    assert!(field.value(&p).abs() < d.tolerance);
}

#[test]
fn endpoint_order_does_not_matter_for_the_side() {
    let field = torus();
    let a = Point::new(2.0, 0.0, 0.0);
    let b = Point::new(2.0, 0.0, 1.5);
    let (va, vb) = (field.value(&a), field.value(&b));

    let d = Dichotomy::new(1e-10, 64).unwrap();
    let forward = d.refine(&field, a, va, b, vb);
    let backward = d.refine(&field, b, vb, a, va);
    assert_abs_diff_eq!(forward.z, 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(backward.z, 0.5, epsilon = 1e-9);
}

#[test]
fn rejects_non_positive_tolerances() {
    assert!(Dichotomy::new(0.0, 8).is_err());
    assert!(Dichotomy::new(-1.0, 8).is_err());
    assert!(Dichotomy::new(Value::INFINITY, 8).is_err());
}

#[test]
fn classification_is_strict() {
    let d = Dichotomy::new(1e-3, 8).unwrap();
    assert_eq!(d.classify(-1e-300), Sign::Inside);
    assert_eq!(d.classify(0.0), Sign::Outside);
    assert_eq!(d.classify(Value::NAN), Sign::Outside);
    assert_eq!(d.with_non_finite(Sign::Inside).classify(Value::NEG_INFINITY), Sign::Inside);
}

#[test]
fn unbracketed_segments_stay_on_the_segment() {
    let field = |p: &Point| p.coords.norm() - 1.0;
    let a = Point::new(2.0, 0.0, 0.0);
    let b = a + Vector::new(0.0, 1.0, 0.0);
    let d = Dichotomy::new(1e-6, 16).unwrap();
    let p = d.refine(&field, a, field(&a), b, field(&b));
    assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-12);
    assert!((0.0..=1.0).contains(&p.y));
}
