use std::{collections::HashMap, f64::consts::PI};

use approx::assert_relative_eq;
use implicit_mc::{
    Aabb, ImplicitTree, Mesh, PolygonizeConfig, ScalarField, polygonize, polygonize_with,
    types::{Point, Value, Vector},
};

fn unit_sphere() -> ImplicitTree {
    let mut tree = ImplicitTree::new();
    let s = tree.sphere(Point::origin(), 1.0).unwrap();
    tree.set_root(s).unwrap();
    tree
}

fn mesh_of<F: ScalarField>(field: &F, resolution: usize, half_extent: Value) -> Mesh {
    let mut mesh = Mesh::new_empty();
    field
        .polygonize(resolution, &mut mesh, &Aabb::cube(half_extent), 1e-6)
        .unwrap();
    mesh
}

fn signed_volume(mesh: &Mesh) -> Value {
    (0..mesh.triangle_count())
        .map(|tri| {
            let [a, b, c] = mesh.tri_coords(tri);
            a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
        })
        .sum()
}

fn ordered_edge(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

#[test]
fn sphere_vertices_lie_on_the_surface() {
    let mesh = mesh_of(&unit_sphere(), 24, 1.5);
    assert!(mesh.triangle_count() > 100);
    assert_eq!(mesh.vertex_indices.len() % 3, 0);
    assert_eq!(mesh.normals.len(), mesh.vertices.len());

    for p in &mesh.vertices {
        let r = p.coords.norm();
        assert!((r - 1.0).abs() < 1e-5, "vertex at radius {r}");
    }
}

#[test]
fn coarse_sphere_faces_outwards() {
    let mesh = mesh_of(&unit_sphere(), 10, 2.0);
    assert!(mesh.vertex_count() > 0);

    let facing: Value = (0..mesh.triangle_count())
        .map(|tri| mesh.tri_normal(tri).dot(&mesh.tri_coords(tri)[0].coords))
        .sum::<Value>()
        / mesh.triangle_count() as Value;
    assert!(facing > 0.0);
    assert!(signed_volume(&mesh) > 0.0);
}

#[test]
fn sphere_normals_point_outwards() {
    let mesh = mesh_of(&unit_sphere(), 24, 1.5);

    for (p, n) in mesh.vertices.iter().zip(&mesh.normals) {
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
        assert!(n.dot(&p.coords) > 0.99, "normal {n} at {p}");
    }

    let facing: Value = (0..mesh.triangle_count())
        .map(|tri| {
            let [a, b, c] = mesh.tri_coords(tri);
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            mesh.tri_normal(tri).dot(&centroid)
        })
        .sum::<Value>()
        / mesh.triangle_count() as Value;
    assert!(facing > 0.7, "mean facing {facing}");
}

#[test]
fn sphere_matches_analytical_volume_and_area() {
    let mesh = mesh_of(&unit_sphere(), 32, 1.5);

    // Counter-clockwise triangles seen from outside give a positive volume.
    let volume = signed_volume(&mesh);
    let exact_volume = 4.0 * PI / 3.0;
    assert!(
        (volume - exact_volume).abs() / exact_volume < 0.05,
        "volume {volume}"
    );

    let area = mesh.area();
    let exact_area = 4.0 * PI;
    assert!((area - exact_area).abs() / exact_area < 0.05, "area {area}");
}

#[test]
fn volume_error_shrinks_with_resolution() {
    let exact_volume = 4.0 * PI / 3.0;
    let error = |resolution| {
        let mesh = mesh_of(&unit_sphere(), resolution, 1.5);
        (signed_volume(&mesh) - exact_volume).abs()
    };

    let low = error(12);
    let high = error(36);
    assert!(high < low, "{high} !< {low}");
}

#[test]
fn welded_sphere_is_watertight() {
    let raw = mesh_of(&unit_sphere(), 20, 1.5);
    let mesh = raw.weld();

    assert_eq!(mesh.triangle_count(), raw.triangle_count());
    assert!(mesh.vertex_count() < raw.vertex_count());

    let mut edge_counts = HashMap::<(usize, usize), usize>::new();
    for tri in mesh.vertex_indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            *edge_counts.entry(ordered_edge(a, b)).or_insert(0) += 1;
        }
    }
    for (edge, count) in edge_counts {
        assert_eq!(count, 2, "non-manifold edge {edge:?} has count {count}");
    }
}

#[test]
fn features_between_samples_are_missed() {
    // No sample of the grid falls inside either sphere.
    let mut tree = ImplicitTree::new();
    let tiny = tree.sphere(Point::origin(), 0.1).unwrap();
    let far = tree.sphere(Point::new(10.0, 10.0, 10.0), 2.0).unwrap();
    let root = tree.union(tiny, far).unwrap();
    tree.set_root(root).unwrap();

    let mesh = mesh_of(&tree, 4, 1.0);
    assert!(mesh.is_empty());
    assert_eq!(mesh.vertex_count(), 0);
}

#[test]
fn uniform_fields_are_empty() {
    assert!(mesh_of(&|_: &Point| 1.0, 10, 1.0).is_empty());
    assert!(mesh_of(&|_: &Point| -1.0, 10, 1.0).is_empty());
    assert!(mesh_of(&ImplicitTree::new(), 10, 1.0).is_empty());
}

#[test]
fn off_center_domains_are_sampled_in_place() {
    let mut tree = ImplicitTree::new();
    let s = tree.sphere(Point::new(5.0, -3.0, 2.0), 0.8).unwrap();
    tree.set_root(s).unwrap();

    let domain = Aabb::from_center(Point::new(5.0, -3.0, 2.0), Vector::new(2.0, 2.5, 3.0));
    let mut mesh = Mesh::new_empty();
    polygonize(&tree, 20, &mut mesh, &domain, 1e-6).unwrap();

    assert!(!mesh.is_empty());
    for p in &mesh.vertices {
        assert!(domain.contains(p));
        assert!(((p - Point::new(5.0, -3.0, 2.0)).norm() - 0.8).abs() < 1e-4);
    }
}

#[test]
fn coarse_tolerance_still_brackets_the_surface() {
    let config = PolygonizeConfig::default().with_epsilon(0.05).with_max_depth(2);
    let mut mesh = Mesh::new_empty();
    polygonize_with(&unit_sphere(), 16, &mut mesh, &Aabb::cube(1.5), &config).unwrap();

    // A vertex stays within one voxel of the surface.
    let voxel = 3.0 / 15.0;
    assert!(!mesh.is_empty());
    for p in &mesh.vertices {
        assert!((p.coords.norm() - 1.0).abs() < voxel);
    }
}
