use crate::{
    dichotomy::Dichotomy,
    domain::Aabb,
    error::{ImplicitError, Result},
    field::{DEFAULT_GRADIENT_STEP, ScalarField},
    grid::SampleGrid,
    mesh::Mesh,
    tables::{CORNER_POINT_INDICES, EDGE_TABLE},
    types::{Point, Sign, Value},
    utils::{get_edge_points, get_state, triangles_from_state},
};

/// Options for [`polygonize_with`].
///
/// ```rust
/// use implicit_mc::{PolygonizeConfig, types::Sign};
///
/// let config = PolygonizeConfig::default()
///     .with_epsilon(1e-3)
///     .with_non_finite(Sign::Inside);
/// assert_eq!(config.gradient_step, implicit_mc::DEFAULT_GRADIENT_STEP);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonizeConfig {
    /// Dichotomy tolerance: vertices are placed where the field is within
    /// `epsilon` of zero, or on a bracket shorter than `epsilon`. Default: `1e-4`.
    pub epsilon: Value,

    /// Central difference step for vertex normals. Default: [`DEFAULT_GRADIENT_STEP`].
    pub gradient_step: Value,

    /// Side assigned to samples where the field is NaN or infinite.
    /// Default: [`Sign::Outside`].
    pub non_finite: Sign,

    /// Dichotomy probes per edge. Default: `None`, derived from the voxel
    /// size and `epsilon` (see [`Dichotomy::for_segment`]).
    pub max_depth: Option<u32>,
}

impl Default for PolygonizeConfig {
    fn default() -> Self {
        Self {
            epsilon: 1.0e-4,
            gradient_step: DEFAULT_GRADIENT_STEP,
            non_finite: Sign::Outside,
            max_depth: None,
        }
    }
}

impl PolygonizeConfig {
    pub fn with_epsilon(mut self, epsilon: Value) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_gradient_step(mut self, step: Value) -> Self {
        self.gradient_step = step;
        self
    }

    pub fn with_non_finite(mut self, sign: Sign) -> Self {
        self.non_finite = sign;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn validate(&self) -> Result<()> {
        for tolerance in [self.epsilon, self.gradient_step] {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(ImplicitError::InvalidTolerance(tolerance));
            }
        }
        Ok(())
    }

    fn dichotomy(&self, edge_length: Value) -> Result<Dichotomy> {
        let dichotomy = match self.max_depth {
            Some(depth) => Dichotomy::new(self.epsilon, depth)?,
            None => Dichotomy::for_segment(edge_length, self.epsilon)?,
        };
        Ok(dichotomy.with_non_finite(self.non_finite))
    }
}

/// Polygonizes `field` with the default options and dichotomy tolerance `epsilon`.
///
/// Same as [`ScalarField::polygonize`].
pub fn polygonize<F>(
    field: &F,
    resolution: usize,
    out: &mut Mesh,
    domain: &Aabb,
    epsilon: Value,
) -> Result<()>
where
    F: ScalarField + ?Sized,
{
    let config = PolygonizeConfig::default().with_epsilon(epsilon);
    polygonize_with(field, resolution, out, domain, &config)
}

/// Runs marching cubes over `domain`, sampled with `resolution` points per
/// axis (`resolution - 1` voxels), and stores the result in `out`.
///
/// `resolution == 0` is an error, as is a resolution too large to sample.
/// A single sample per axis or a flat domain gives an empty mesh. On error
/// `out` is left untouched.
///
/// Samples are kept for two corner layers at a time, so memory grows with
/// `resolution²` besides the mesh itself.
///
/// ```text
/// Per voxel:
/// 1. slab.get (×8)            →  8 scalar values, sampled once per corner
/// 2. get_state                →  256-entry lookup key, 0x00 / 0xFF skipped
/// 3. EDGE_TABLE[state]        →  bitmask of intersected edges
/// 4. get_edge_points          →  up to 12 surface points, refined by dichotomy
/// 5. ScalarField::normal      →  one normal per point
/// 6. triangles_from_state     →  triangles from TRI_TABLE
/// ```
///
/// Vertices are not shared between voxels, use [`Mesh::weld`] to merge them.
pub fn polygonize_with<F>(
    field: &F,
    resolution: usize,
    out: &mut Mesh,
    domain: &Aabb,
    config: &PolygonizeConfig,
) -> Result<()>
where
    F: ScalarField + ?Sized,
{
    config.validate()?;
    if resolution == 0 {
        return Err(ImplicitError::InvalidResolution(resolution));
    }
    if resolution < 2 || domain.is_degenerate() {
        tracing::debug!(resolution, ?domain, "nothing to polygonize");
        *out = Mesh::new_empty();
        return Ok(());
    }

    let grid = SampleGrid::new(domain, resolution)?;
    let dichotomy = config.dichotomy(grid.scale.max())?;

    *out = run_marching_cubes(field, &grid, &dichotomy, config.gradient_step)?;
    Ok(())
}

fn run_marching_cubes<F>(
    field: &F,
    grid: &SampleGrid,
    dichotomy: &Dichotomy,
    gradient_step: Value,
) -> Result<Mesh>
where
    F: ScalarField + ?Sized,
{
    let mut mesh = Mesh::new_empty();
    let mut active = 0_usize;
    let mut slab = grid.first_slab(field)?;

    loop {
        let z = slab.z;
        for y in 0..grid.size_y {
            for x in 0..grid.size_x {
                let corner_indices = grid.voxel_corner_indices(x, y, z);
                let corner_values = corner_indices.map(|[cx, cy, cz]| slab.get(cx, cy, cz));

                let state = get_state(&corner_values, dichotomy);
                if state == 0x00 || state == 0xFF {
                    continue;
                }
                active += 1;

                let corner_positions: [Point; 8] =
                    corner_indices.map(|[cx, cy, cz]| grid.corner_position(cx, cy, cz));

                let edge_points = get_edge_points(
                    field,
                    dichotomy,
                    EDGE_TABLE[state as usize],
                    &CORNER_POINT_INDICES,
                    &corner_indices,
                    &corner_positions,
                    &corner_values,
                );

                let edge_vertices = edge_points.map(|point| {
                    point.map(|p| mesh.push_vertex(p, field.normal(&p, gradient_step)))
                });

                for tri in triangles_from_state(state) {
                    mesh.push_triangle(tri.map(|edge| {
                        edge_vertices[edge].expect("triangle uses an edge without a crossing")
                    }));
                }
            }
        }

        if !grid.advance(field, &mut slab) {
            break;
        }
    }

    let non_finite = slab.non_finite_count();
    if non_finite > 0 {
        tracing::warn!(
            non_finite,
            policy = ?dichotomy.non_finite,
            "field is not finite at some grid corners"
        );
    }

    tracing::debug!(
        voxels = grid.voxel_count(),
        active,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "polygonized implicit field"
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector;

    #[test]
    fn rejects_bad_configuration() {
        let field = |p: &Point| p.x;
        let mut out = Mesh::new_empty();
        let domain = Aabb::cube(1.0);

        assert_eq!(
            polygonize(&field, 0, &mut out, &domain, 1e-4),
            Err(ImplicitError::InvalidResolution(0))
        );
        assert_eq!(
            polygonize(&field, 8, &mut out, &domain, 0.0),
            Err(ImplicitError::InvalidTolerance(0.0))
        );
        let config = PolygonizeConfig::default().with_gradient_step(Value::NAN);
        assert!(polygonize_with(&field, 8, &mut out, &domain, &config).is_err());
    }

    #[test]
    fn error_leaves_output_untouched() {
        let field = |p: &Point| p.x;
        let mut out = Mesh::new_empty();
        polygonize(&field, 4, &mut out, &Aabb::cube(1.0), 1e-4).unwrap();
        let before = out.clone();
        assert!(!before.is_empty());

        assert!(polygonize(&field, 0, &mut out, &Aabb::cube(1.0), 1e-4).is_err());
        assert_eq!(out, before);
    }

    #[test]
    fn oversized_resolution_is_an_error() {
        let field = |p: &Point| p.x;
        let mut out = Mesh::new_empty();
        assert_eq!(
            polygonize(&field, 3_000_000, &mut out, &Aabb::cube(1.0), 1e-4),
            Err(ImplicitError::InvalidResolution(3_000_000))
        );
        assert!(out.is_empty());
    }

    #[test]
    fn degenerate_grids_give_empty_meshes() {
        let field = |p: &Point| p.x;
        let mut out = Mesh::new_empty();
        out.push_vertex(Point::origin(), Vector::z());

        polygonize(&field, 1, &mut out, &Aabb::cube(1.0), 1e-4).unwrap();
        assert_eq!(out, Mesh::new_empty());

        let flat = Aabb::new(Point::new(-1.0, -1.0, 0.0), Point::new(1.0, 1.0, 0.0));
        polygonize(&field, 10, &mut out, &flat, 1e-4).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn plane_crossing_every_column_gives_two_triangles_per_column() {
        // x = 0.1 crosses one voxel in every (y, z) column of a 4-voxel grid.
        let field = |p: &Point| p.x - 0.1;
        let mut out = Mesh::new_empty();
        polygonize(&field, 5, &mut out, &Aabb::cube(1.0), 1e-6).unwrap();

        assert_eq!(out.triangle_count(), 2 * 4 * 4);
        assert_eq!(out.vertex_count(), 4 * 4 * 4);
        for (p, n) in out.vertices.iter().zip(&out.normals) {
            assert!((p.x - 0.1).abs() < 1e-6);
            assert!((n.x - 1.0).abs() < 1e-6);
        }
        for tri in 0..out.triangle_count() {
            assert!(out.tri_normal(tri).x > 0.99);
        }
    }

    #[test]
    fn non_finite_policy_decides_the_side() {
        // Undefined for x > 0.5: outside by default, inside on request.
        let field = |p: &Point| if p.x > 0.5 { Value::NAN } else { -1.0 };
        let domain = Aabb::cube(1.0);
        let mut out = Mesh::new_empty();

        polygonize(&field, 5, &mut out, &domain, 1e-4).unwrap();
        assert!(!out.is_empty());
        assert!(out.vertices.iter().all(|p| p.iter().all(|c| c.is_finite())));

        let inside = PolygonizeConfig::default().with_non_finite(Sign::Inside);
        polygonize_with(&field, 5, &mut out, &domain, &inside).unwrap();
        assert!(out.is_empty());
    }
}
