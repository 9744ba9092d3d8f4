//! Ready-made implicit scenes, each with the domain and sampling it was
//! designed for.
//!
//! Full-resolution scenes take several seconds to polygonize in release
//! builds. Use [`Scene::with_resolution`] for quick previews.

use crate::{
    domain::Aabb,
    error::Result,
    field::ScalarField,
    mesh::Mesh,
    tree::ImplicitTree,
    types::{Point, Value, Vector},
};

/// An implicit tree together with the way it should be polygonized.
#[derive(Debug, Clone)]
pub struct Scene {
    pub tree: ImplicitTree,
    pub domain: Aabb,
    /// Samples per axis.
    pub resolution: usize,
    pub epsilon: Value,
}

impl Scene {
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn polygonize(&self) -> Result<Mesh> {
        let mut mesh = Mesh::new_empty();
        self.tree
            .polygonize(self.resolution, &mut mesh, &self.domain, self.epsilon)?;
        Ok(mesh)
    }
}

/// A box with a torus carved out of it.
pub fn carved_box() -> Result<Scene> {
    let mut tree = ImplicitTree::new();
    let block = tree.exact_box(Point::new(5.0, 0.0, 0.0), Vector::repeat(8.0))?;
    let ring = tree.torus(Point::origin(), 10.0, 3.0)?;
    let root = tree.difference(block, ring)?;
    tree.set_root(root)?;

    Ok(Scene {
        tree,
        domain: Aabb::cube(20.0),
        resolution: 400,
        epsilon: 1.0e-3,
    })
}

/// Two thin plates on four capsule legs, blended together, with a hollow
/// squashed bowl floating above.
pub fn table_and_bowl() -> Result<Scene> {
    let leg_radius = 0.25;
    let half_height = 3.0;
    let spread = 5.0;

    let mut tree = ImplicitTree::new();

    let mut legs = Vec::with_capacity(4);
    for (x, y) in [(-spread, -spread), (spread, -spread), (-spread, spread), (spread, spread)] {
        legs.push(tree.capsule(
            Point::new(x, y, half_height),
            Vector::z(),
            half_height,
            leg_radius,
        )?);
    }
    let front = tree.union(legs[0], legs[1])?;
    let back = tree.union(legs[2], legs[3])?;
    let legs = tree.union(front, back)?;

    let plate_size = Vector::new(5.0, 5.0, 0.1);
    let low = tree.exact_box(Point::new(0.0, 0.0, half_height), plate_size)?;
    let high = tree.exact_box(Point::new(0.0, 0.0, 2.0 * half_height), plate_size)?;
    let plates = tree.union(low, high)?;
    let table = tree.blend(plates, legs, 10.0)?;

    let outer = tree.sphere(Point::origin(), 3.0)?;
    let inner = tree.sphere(Point::new(0.0, 0.0, 0.25), 3.0)?;
    let shell = tree.difference(outer, inner)?;
    let shell = tree.scale(shell, Vector::new(1.1, 1.3, 0.7))?;
    let fruit = tree.sphere(Point::new(-0.25, 0.1, -1.2), 1.0)?;
    let bowl = tree.union(fruit, shell)?;
    let bowl = tree.translate(bowl, Vector::new(0.0, 0.0, 2.0 * half_height + 2.0))?;

    let root = tree.union(table, bowl)?;
    tree.set_root(root)?;

    Ok(Scene {
        tree,
        domain: Aabb::cube(30.0),
        resolution: 500,
        epsilon: 1.0e-3,
    })
}

/// Two boxes and two spheres chained through increasingly wide blends.
pub fn blended_boxes() -> Result<Scene> {
    let mut tree = ImplicitTree::new();
    let a = tree.exact_box(Point::origin(), Vector::repeat(5.0))?;
    let b = tree.exact_box(Point::new(10.0, 10.0, 10.0), Vector::repeat(5.0))?;
    let c = tree.sphere(Point::new(18.0, 18.0, 18.0), 5.0)?;
    let d = tree.sphere(Point::new(24.0, 24.0, 24.0), 5.0)?;

    let ab = tree.blend(a, b, 30.0)?;
    let abc = tree.blend(ab, c, 100.0)?;
    let root = tree.blend(abc, d, 50.0)?;
    tree.set_root(root)?;

    Ok(Scene {
        tree,
        domain: Aabb::cube(100.0),
        resolution: 500,
        epsilon: 1.0e-3,
    })
}

/// A torus repeated every 40 units on each axis.
pub fn torus_lattice() -> Result<Scene> {
    let mut tree = ImplicitTree::new();
    let ring = tree.torus(Point::origin(), 10.0, 5.0)?;
    let root = tree.replicate(ring, Vector::repeat(20.0))?;
    tree.set_root(root)?;

    Ok(Scene {
        tree,
        domain: Aabb::cube(300.0),
        resolution: 400,
        epsilon: 1.0e-3,
    })
}

/// Every scene of this module, by name.
pub fn all() -> Result<Vec<(&'static str, Scene)>> {
    Ok(vec![
        ("carved_box", carved_box()?),
        ("table_and_bowl", table_and_bowl()?),
        ("blended_boxes", blended_boxes()?),
        ("torus_lattice", torus_lattice()?),
    ])
}
