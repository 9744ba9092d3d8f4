use std::collections::HashMap;

use crate::{
    error::{ImplicitError, Result},
    types::{Point, Value, Vector},
};

/// Triangle soup produced by the polygonizer.
///
/// Every group of three consecutive entries in `vertex_indices` (and
/// `normal_indices`) forms one triangle, wound counter-clockwise seen from
/// outside the surface. Triangles emitted by the polygonizer use the same
/// index for a vertex and its normal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point>,

    /// Unit surface normals, or zero where the field gradient vanishes.
    pub normals: Vec<Vector>,

    /// Triangle corners as indices into `vertices`: `[v0, v1, v2, v3, ...]`
    pub vertex_indices: Vec<usize>,

    /// Triangle corners as indices into `normals`, parallel to `vertex_indices`.
    pub normal_indices: Vec<usize>,
}

impl Mesh {
    /// Creates an empty mesh with no vertices, triangles, or normals.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Assembles a mesh from its buffers, checking that every index is in bounds.
    pub fn new(
        vertices: Vec<Point>,
        normals: Vec<Vector>,
        vertex_indices: Vec<usize>,
        normal_indices: Vec<usize>,
    ) -> Result<Self> {
        if vertex_indices.len() != normal_indices.len() || vertex_indices.len() % 3 != 0 {
            return Err(ImplicitError::MismatchedIndices {
                vertices: vertex_indices.len(),
                normals: normal_indices.len(),
            });
        }
        check_indices(&vertex_indices, vertices.len())?;
        check_indices(&normal_indices, normals.len())?;
        Ok(Self {
            vertices,
            normals,
            vertex_indices,
            normal_indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }

    /// Appends a vertex with its normal and returns the index shared by both.
    ///
    /// Keeps `vertices` and `normals` the same length; meshes built with
    /// [`Mesh::new`] from unequal buffers should not mix in this method.
    pub fn push_vertex(&mut self, position: Point, normal: Vector) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        self.normals.push(normal);
        index
    }

    /// Adds a triangle defined by three vertex indices, also used as normal indices.
    ///
    /// Returns [`ImplicitError::InvalidIndex`] if any index is out of bounds.
    pub fn triangle_from_verts(&mut self, x: usize, y: usize, z: usize) -> Result<()> {
        let len = self.vertices.len().min(self.normals.len());
        let index = x.max(y.max(z));
        if len <= index {
            return Err(ImplicitError::InvalidIndex { index, len });
        }
        self.push_triangle([x, y, z]);
        Ok(())
    }

    #[inline]
    pub(crate) fn push_triangle(&mut self, tri: [usize; 3]) {
        self.vertex_indices.extend_from_slice(&tri);
        self.normal_indices.extend_from_slice(&tri);
    }

    /// Returns the three vertex positions of triangle `tri`.
    pub fn tri_coords(&self, tri: usize) -> [Point; 3] {
        let corners = &self.vertex_indices[3 * tri..3 * tri + 3];
        [
            self.vertices[corners[0]],
            self.vertices[corners[1]],
            self.vertices[corners[2]],
        ]
    }

    /// Returns the three vertex normals of triangle `tri`.
    pub fn tri_normals(&self, tri: usize) -> [Vector; 3] {
        let corners = &self.normal_indices[3 * tri..3 * tri + 3];
        [
            self.normals[corners[0]],
            self.normals[corners[1]],
            self.normals[corners[2]],
        ]
    }

    /// Computes the face normal for triangle `tri` from its winding.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn tri_normal(&self, tri: usize) -> Vector {
        let [a, b, c] = self.tri_coords(tri);

        let v_a_b = b - a;
        let v_b_c = c - b;

        let cross = v_a_b.cross(&v_b_c);

        let nrm = cross.norm();
        if nrm == 0.0 {
            Vector::zeros()
        } else {
            cross / nrm
        }
    }

    /// Sum of the triangle areas.
    pub fn area(&self) -> Value {
        (0..self.triangle_count())
            .map(|tri| {
                let [a, b, c] = self.tri_coords(tri);
                0.5 * (b - a).cross(&(c - a)).norm()
            })
            .sum()
    }

    /// Merges vertices with bit-identical positions.
    ///
    /// The polygonizer emits every vertex once per voxel touching its edge;
    /// this compacts those duplicates into one shared vertex. Each welded
    /// vertex keeps the normal of the first triangle corner referring to it,
    /// and vertices not used by any triangle are dropped.
    pub fn weld(&self) -> Mesh {
        let mut welded = Mesh::new_empty();
        let mut lookup: HashMap<[u64; 3], usize> = HashMap::new();

        for (&vi, &ni) in self.vertex_indices.iter().zip(&self.normal_indices) {
            let position = self.vertices[vi];
            let index = *lookup.entry(position_key(&position)).or_insert_with(|| {
                welded.push_vertex(position, self.normals[ni])
            });
            welded.vertex_indices.push(index);
            welded.normal_indices.push(index);
        }

        welded
    }
}

fn check_indices(indices: &[usize], len: usize) -> Result<()> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(ImplicitError::InvalidIndex { index, len }),
        None => Ok(()),
    }
}

// -0.0 and 0.0 weld together.
fn position_key(p: &Point) -> [u64; 3] {
    [p.x, p.y, p.z].map(|c| if c == 0.0 { 0.0_f64.to_bits() } else { c.to_bits() })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn quad() -> Mesh {
        // Two triangles sharing an edge, with the shared corners duplicated.
        let mut mesh = Mesh::new_empty();
        let n = Vector::z();
        for p in [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 0.0, -0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ] {
            mesh.push_vertex(p, n);
        }
        mesh.triangle_from_verts(0, 1, 2).unwrap();
        mesh.triangle_from_verts(3, 4, 5).unwrap();
        mesh
    }

    #[test]
    fn new_rejects_out_of_bounds_indices() {
        let vertices = vec![Point::origin(); 3];
        let normals = vec![Vector::z(); 3];
        assert_eq!(
            Mesh::new(vertices.clone(), normals.clone(), vec![0, 1, 3], vec![0, 1, 2]),
            Err(ImplicitError::InvalidIndex { index: 3, len: 3 })
        );
        assert!(matches!(
            Mesh::new(vertices.clone(), normals.clone(), vec![0, 1], vec![0, 1]),
            Err(ImplicitError::MismatchedIndices { .. })
        ));
        assert!(Mesh::new(vertices, normals, vec![0, 1, 2], vec![2, 1, 0]).is_ok());
    }

    #[test]
    fn triangle_from_verts_checks_bounds() {
        let mut mesh = quad();
        assert!(mesh.triangle_from_verts(0, 1, 6).is_err());
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn face_normal_follows_winding() {
        let mesh = quad();
        assert_eq!(mesh.tri_normal(0), Vector::z());
        assert_abs_diff_eq!(mesh.area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn tri_normals_follow_normal_indices() {
        let mesh = Mesh::new(
            vec![Point::origin(), Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0)],
            vec![Vector::x(), Vector::y(), Vector::z()],
            vec![0, 1, 2],
            vec![2, 2, 0],
        )
        .unwrap();
        assert_eq!(mesh.tri_normals(0), [Vector::z(), Vector::z(), Vector::x()]);
        assert_eq!(quad().tri_normals(1), [Vector::z(); 3]);
    }

    #[test]
    fn weld_merges_duplicate_positions() {
        let welded = quad().weld();
        assert_eq!(welded.vertex_count(), 4);
        assert_eq!(welded.triangle_count(), 2);
        assert_eq!(welded.vertex_indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(welded.vertex_indices, welded.normal_indices);
        assert_eq!(welded.tri_coords(1), quad().tri_coords(1));
    }
}
