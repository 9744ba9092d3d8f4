use std::mem;

use ndarray::Array2;

use crate::{
    domain::Aabb,
    error::{ImplicitError, Result},
    field::ScalarField,
    tables::CORNER_OFFSETS,
    types::{Point, Value, Vector},
};

/// A regular grid of voxels spanning a domain.
///
/// The grid has `(size_x + 1) × (size_y + 1) × (size_z + 1)` corner points
/// and `size_x × size_y × size_z` voxels. Samples are not stored here: the
/// sweep walks the grid one [`Slab`] of voxels at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    /// Number of voxels along X.
    pub size_x: usize,
    /// Number of voxels along Y.
    pub size_y: usize,
    /// Number of voxels along Z.
    pub size_z: usize,
    /// World-space position of corner `(0, 0, 0)`.
    pub origin: Point,
    /// World-space size of a voxel along each axis.
    pub scale: Vector,
}

impl SampleGrid {
    /// Grid with `resolution` evenly spaced samples per axis spanning
    /// `domain`, bounds included.
    ///
    /// Fails with [`ImplicitError::InvalidResolution`] if `resolution` is
    /// below 2 or the number of samples does not fit in a `usize`.
    pub fn new(domain: &Aabb, resolution: usize) -> Result<Self> {
        let samples = resolution
            .checked_mul(resolution)
            .and_then(|n| n.checked_mul(resolution));
        if resolution < 2 || samples.is_none() {
            return Err(ImplicitError::InvalidResolution(resolution));
        }

        let cells = resolution - 1;
        Ok(Self {
            size_x: cells,
            size_y: cells,
            size_z: cells,
            origin: domain.min,
            scale: domain.diagonal() / cells as Value,
        })
    }

    /// Total number of voxels.
    pub fn voxel_count(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Returns the world-space position of corner `(x, y, z)`.
    ///
    /// Computed from the integer index so a corner shared by several voxels
    /// always gets the same coordinates.
    #[inline]
    pub fn corner_position(&self, x: usize, y: usize, z: usize) -> Point {
        Point::new(
            self.origin.x + x as Value * self.scale.x,
            self.origin.y + y as Value * self.scale.y,
            self.origin.z + z as Value * self.scale.z,
        )
    }

    /// Returns the 8 corner indices `[x, y, z]` of the voxel at `(x, y, z)`,
    /// in the corner order of [`tables`](crate::tables).
    #[inline]
    pub fn voxel_corner_indices(&self, x: usize, y: usize, z: usize) -> [[usize; 3]; 8] {
        CORNER_OFFSETS.map(|[dx, dy, dz]| [x + dx, y + dy, z + dz])
    }

    /// Samples the two bottom corner layers, i.e. the voxels at `z = 0`.
    ///
    /// The two layers are the only allocations of a sweep. If they cannot be
    /// allocated this fails with [`ImplicitError::InvalidResolution`].
    pub fn first_slab<F>(&self, field: &F) -> Result<Slab>
    where
        F: ScalarField + ?Sized,
    {
        let mut slab = Slab {
            z: 0,
            lower: self.allocate_layer()?,
            upper: self.allocate_layer()?,
            non_finite: 0,
        };
        slab.non_finite += self.fill_layer(field, &mut slab.lower, 0);
        slab.non_finite += self.fill_layer(field, &mut slab.upper, 1);
        Ok(slab)
    }

    /// Moves `slab` one voxel up, sampling only the new top layer.
    ///
    /// Returns `false`, leaving `slab` alone, when it already holds the top
    /// voxels of the grid.
    pub fn advance<F>(&self, field: &F, slab: &mut Slab) -> bool
    where
        F: ScalarField + ?Sized,
    {
        if slab.z + 1 >= self.size_z {
            return false;
        }
        mem::swap(&mut slab.lower, &mut slab.upper);
        slab.z += 1;
        slab.non_finite += self.fill_layer(field, &mut slab.upper, slab.z + 1);
        true
    }

    fn allocate_layer(&self) -> Result<Array2<Value>> {
        let shape = (self.size_y + 1, self.size_x + 1);
        let too_large = || ImplicitError::InvalidResolution(self.size_x + 1);

        let len = shape.0.checked_mul(shape.1).ok_or_else(too_large)?;
        let mut values = Vec::new();
        values.try_reserve_exact(len).map_err(|_| too_large())?;
        values.resize(len, 0.0);
        Array2::from_shape_vec(shape, values).map_err(|_| too_large())
    }

    // Returns the number of non-finite samples written.
    fn fill_layer<F>(&self, field: &F, layer: &mut Array2<Value>, z: usize) -> usize
    where
        F: ScalarField + ?Sized,
    {
        let mut non_finite = 0;
        for ((y, x), value) in layer.indexed_iter_mut() {
            *value = field.value(&self.corner_position(x, y, z));
            if !value.is_finite() {
                non_finite += 1;
            }
        }
        non_finite
    }
}

/// Samples of the two corner layers bounding one z-slab of voxels.
///
/// Each corner is evaluated exactly once over a sweep: advancing reuses the
/// upper layer as the next lower one. Layers are indexed `[y, x]`.
#[derive(Debug, Clone)]
pub struct Slab {
    /// Z index of the voxels covered, i.e. of the lower corner layer.
    pub z: usize,
    lower: Array2<Value>,
    upper: Array2<Value>,
    non_finite: usize,
}

impl Slab {
    /// Returns the sample at corner `(x, y, z)`, with `z` either
    /// [`Slab::z`] or `Slab::z + 1`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Value {
        debug_assert!(z == self.z || z == self.z + 1);
        if z == self.z {
            self.lower[[y, x]]
        } else {
            self.upper[[y, x]]
        }
    }

    /// Number of NaN or infinite samples seen since the first slab.
    pub fn non_finite_count(&self) -> usize {
        self.non_finite
    }
}
