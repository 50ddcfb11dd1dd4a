//! Grid layout, linear indexing and canonical neighbour tables.
//!
//! The field is a dense `Nx * Ny * Nz` array with `iz` contiguous:
//! `ii = ix * (Ny * Nz) + iy * Nz + iz`. All stencil arithmetic assumes
//! this ordering; neighbour lookups are plain offsets on `ii`.

use serde::{Deserialize, Serialize};

/// Lattice and stencil selection.
///
/// The scheme flag in scene files is 0 (Cartesian), 1 (FCC checkerboard)
/// or 2 (FCC folded). Checkerboard FCC updates only cells of one parity;
/// folded FCC packs the lattice into a half-height grid and visits every
/// cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Scheme {
    /// 7-point stencil on the axis-aligned cubic lattice.
    Cartesian,
    /// 13-point FCC stencil on a checkerboard subset of the cubic grid.
    FccCheckerboard,
    /// 13-point FCC stencil on the folded (half-offset) grid.
    FccFolded,
}

impl Scheme {
    /// Decode the scene-file scheme flag.
    pub fn from_flag(flag: i8) -> Option<Self> {
        match flag {
            0 => Some(Scheme::Cartesian),
            1 => Some(Scheme::FccCheckerboard),
            2 => Some(Scheme::FccFolded),
            _ => None,
        }
    }

    /// The scene-file flag value for this scheme.
    pub fn flag(self) -> i8 {
        match self {
            Scheme::Cartesian => 0,
            Scheme::FccCheckerboard => 1,
            Scheme::FccFolded => 2,
        }
    }

    /// True for both FCC variants.
    pub fn is_fcc(self) -> bool {
        self != Scheme::Cartesian
    }

    /// Number of stencil neighbours (6 Cartesian, 12 FCC).
    pub fn neighbor_count(self) -> usize {
        if self.is_fcc() {
            12
        } else {
            6
        }
    }

    /// Stability limit on the squared Courant number.
    pub fn max_l2(self) -> f64 {
        if self.is_fcc() {
            1.0
        } else {
            1.0 / 3.0
        }
    }
}

/// Grid dimensions with the derived strides.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridDims {
    /// Cells in X (slowest-varying)
    pub nx: usize,
    /// Cells in Y
    pub ny: usize,
    /// Cells in Z (contiguous)
    pub nz: usize,
}

impl GridDims {
    /// X-slab stride, `Nz * Ny`.
    #[inline]
    pub fn nzny(&self) -> usize {
        self.nz * self.ny
    }

    /// Total cell count.
    #[inline]
    pub fn npts(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Linear index of cell `(ix, iy, iz)`.
    #[inline]
    pub fn idx(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix * self.nzny() + iy * self.nz + iz
    }

    /// Cell coordinates of linear index `ii`.
    #[inline]
    pub fn coords(&self, ii: usize) -> (usize, usize, usize) {
        (ii / self.nzny(), (ii / self.nz) % self.ny, ii % self.nz)
    }

    /// True if `ii` lies on the outermost one-cell ring.
    pub fn on_outer_ring(&self, ii: usize) -> bool {
        let (ix, iy, iz) = self.coords(ii);
        ix == 0
            || ix == self.nx - 1
            || iy == 0
            || iy == self.ny - 1
            || iz == 0
            || iz == self.nz - 1
    }
}

/// Canonical Cartesian neighbour directions as `(dx, dy, dz)` triples.
///
/// Bit `j` of a rigid-node adjacency word refers to entry `j` here. The
/// scene builder and the rigid stencil share this table; the linear
/// offsets in §stencil code are derived from it, never restated.
pub const CART_NEIGHBORS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Canonical FCC neighbour directions, paired `+o, -o`.
pub const FCC_NEIGHBORS: [[i64; 3]; 12] = [
    [1, 1, 0],
    [-1, -1, 0],
    [0, 1, 1],
    [0, -1, -1],
    [1, 0, 1],
    [-1, 0, -1],
    [1, -1, 0],
    [-1, 1, 0],
    [0, 1, -1],
    [0, -1, 1],
    [1, 0, -1],
    [-1, 0, 1],
];

/// Linearized offset of a neighbour direction on this grid.
#[inline]
pub fn linear_offset(dims: &GridDims, dir: [i64; 3]) -> i64 {
    dir[0] * dims.nzny() as i64 + dir[1] * dims.nz as i64 + dir[2]
}

/// The six Cartesian offsets in canonical bit order.
pub fn cart_offsets(dims: &GridDims) -> [i64; 6] {
    let mut out = [0i64; 6];
    for (o, dir) in out.iter_mut().zip(CART_NEIGHBORS) {
        *o = linear_offset(dims, dir);
    }
    out
}

/// The twelve FCC offsets in canonical bit order.
pub fn fcc_offsets(dims: &GridDims) -> [i64; 12] {
    let mut out = [0i64; 12];
    for (o, dir) in out.iter_mut().zip(FCC_NEIGHBORS) {
        *o = linear_offset(dims, dir);
    }
    out
}

/// Bytes needed for a bit-per-cell mask over `npts` cells.
#[inline]
pub fn mask_len(npts: usize) -> usize {
    npts.div_ceil(8)
}

/// Read bit `ii` of a packed cell mask.
#[inline]
pub fn mask_get(mask: &[u8], ii: usize) -> bool {
    mask[ii >> 3] & (1 << (ii & 7)) != 0
}

/// Set bit `ii` of a packed cell mask.
#[inline]
pub fn mask_set(mask: &mut [u8], ii: usize) {
    mask[ii >> 3] |= 1 << (ii & 7);
}
