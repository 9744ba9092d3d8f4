use crate::{
    dichotomy::Dichotomy,
    field::ScalarField,
    tables::TRI_TABLE,
    types::{Point, Value},
};

/// Computes the marching cubes state bitmask for a voxel.
///
/// Each of the 8 corners maps to one bit. A bit is set when the corner is
/// "inside" the surface, as classified by `dichotomy` (strictly negative
/// values, plus non-finite ones if so configured):
///
/// ```text
/// corner index:  7  6  5  4  3  2  1  0
/// state bits:   [_][_][_][_][_][_][_][_]
///                                      ^-- corner 0 inside?
/// ```
#[inline]
pub fn get_state(corner_values: &[Value; 8], dichotomy: &Dichotomy) -> u8 {
    let mut state = 0u8;
    for (i, &v) in corner_values.iter().enumerate() {
        if dichotomy.classify(v).is_inside() {
            state |= 1 << i;
        }
    }
    state
}

/// Locates the surface crossing on each edge of the voxel flagged in `edges_mask`.
///
/// `edges_mask` is a 12-bit field from `EDGE_TABLE`, a set bit means that
/// edge is active. Each active edge is refined from its lower grid corner to
/// its higher one, whatever the edge's direction in the table, so an edge
/// shared by neighbouring voxels yields the same point in all of them.
#[inline]
pub fn get_edge_points<F>(
    field: &F,
    dichotomy: &Dichotomy,
    edges_mask: u16,
    point_indices: &[[i8; 2]; 12],
    corner_indices: &[[usize; 3]; 8],
    corner_positions: &[Point; 8],
    corner_values: &[Value; 8],
) -> [Option<Point>; 12]
where
    F: ScalarField + ?Sized,
{
    let mut edge_points: [Option<Point>; 12] = [None; 12];

    for (i, edge_point) in edge_points.iter_mut().enumerate() {
        if (edges_mask & (1 << i)) == 0 {
            continue;
        }

        let [mut a, mut b] = point_indices[i].map(|c| c as usize);
        if corner_indices[b] < corner_indices[a] {
            std::mem::swap(&mut a, &mut b);
        }

        *edge_point = Some(dichotomy.refine(
            field,
            corner_positions[a],
            corner_values[a],
            corner_positions[b],
            corner_values[b],
        ));
    }

    edge_points
}

/// Returns the triangles of configuration `state` as triples of edge indices.
///
/// `TRI_TABLE[state]` contains edge indices in groups of three, terminated by `-1`:
/// ```text
/// TRI_TABLE[state] = [e0, e1, e2,  e3, e4, e5,  -1, ...]
///                     \___tri0__/   \___tri1__/
/// ```
/// The table winds triangles clockwise seen from outside a field that is
/// negative inside, so each triple is returned as `[e0, e2, e1]` to face outwards.
#[inline]
pub fn triangles_from_state(state: u8) -> impl Iterator<Item = [usize; 3]> {
    TRI_TABLE[state as usize]
        .chunks_exact(3)
        .take_while(|tri| tri[0] != -1)
        .map(|tri| [tri[0] as usize, tri[2] as usize, tri[1] as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{CORNER_OFFSETS, CORNER_POINT_INDICES, EDGE_TABLE};

    #[test]
    fn state_sets_one_bit_per_inside_corner() {
        let d = Dichotomy::new(1e-4, 8).unwrap();
        let values = [-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -0.5];
        assert_eq!(get_state(&values, &d), 0b1000_0001);
        // Zero is on the outside.
        assert_eq!(get_state(&[0.0; 8], &d), 0);
        assert_eq!(get_state(&[-1.0; 8], &d), 0xFF);
    }

    #[test]
    fn single_corner_yields_one_triangle() {
        let tris: Vec<_> = triangles_from_state(0b0000_0001).collect();
        assert_eq!(tris, vec![[0, 3, 8]]);
        assert_eq!(triangles_from_state(0).count(), 0);
        assert_eq!(triangles_from_state(0xFF).count(), 0);
    }

    #[test]
    fn edge_points_lie_on_the_surface() {
        let field = |p: &Point| p.x - 0.25;
        let d = Dichotomy::new(1e-9, 32).unwrap();
        let corner_indices = CORNER_OFFSETS;
        let corner_positions =
            corner_indices.map(|[x, y, z]| Point::new(x as Value, y as Value, z as Value));
        let corner_values = corner_positions.map(|p| field(&p));
        let state = get_state(&corner_values, &d);
        let points = get_edge_points(
            &field,
            &d,
            EDGE_TABLE[state as usize],
            &CORNER_POINT_INDICES,
            &corner_indices,
            &corner_positions,
            &corner_values,
        );

        // The four X edges are crossed, nothing else.
        let crossed: Vec<usize> = (0..12).filter(|&e| points[e].is_some()).collect();
        assert_eq!(crossed, vec![0, 2, 4, 6]);
        for p in points.iter().flatten() {
            assert!((p.x - 0.25).abs() < 1e-9);
        }
    }
}
