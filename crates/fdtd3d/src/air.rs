//! Interior air-cell update: the second-order leapfrog stencil.
//!
//! Writes the current buffer from the previous buffer and its stencil
//! neighbours, skipping every cell whose bit is set in the boundary
//! mask. The cell's own entry in the write buffer holds its value from
//! two steps ago and is read before being overwritten.

use rayon::prelude::*;

use crate::grid::{mask_get, GridDims, Scheme};
use crate::Real;

/// Advance all interior air cells one step.
///
/// `u0` is the write buffer, `u1` the previous step. Parallelises over
/// x slabs; each worker owns one `Nz * Ny` chunk of `u0` and reads `u1`
/// freely, so no two workers touch the same output cell.
pub fn step_air(
    u0: &mut [Real],
    u1: &[Real],
    bn_mask: &[u8],
    dims: &GridDims,
    scheme: Scheme,
    a1: Real,
    a2: Real,
) {
    match scheme {
        Scheme::Cartesian => step_air_cart(u0, u1, bn_mask, dims, a1, a2),
        _ => step_air_fcc(u0, u1, bn_mask, dims, scheme, a1, a2),
    }
}

fn step_air_cart(
    u0: &mut [Real],
    u1: &[Real],
    bn_mask: &[u8],
    dims: &GridDims,
    a1: Real,
    a2: Real,
) {
    let nzny = dims.nzny();
    let nz = dims.nz;

    u0.par_chunks_mut(nzny)
        .enumerate()
        .skip(1)
        .take(dims.nx - 2)
        .for_each(|(ix, slab)| {
            for iy in 1..dims.ny - 1 {
                let row = iy * nz;
                for iz in 1..nz - 1 {
                    let loc = row + iz;
                    let ii = ix * nzny + loc;
                    if mask_get(bn_mask, ii) {
                        continue;
                    }
                    let mut partial = a1 * u1[ii] - slab[loc];
                    partial += a2 * u1[ii + nzny];
                    partial += a2 * u1[ii - nzny];
                    partial += a2 * u1[ii + nz];
                    partial += a2 * u1[ii - nz];
                    partial += a2 * u1[ii + 1];
                    partial += a2 * u1[ii - 1];
                    slab[loc] = partial;
                }
            }
        });
}

fn step_air_fcc(
    u0: &mut [Real],
    u1: &[Real],
    bn_mask: &[u8],
    dims: &GridDims,
    scheme: Scheme,
    a1: Real,
    a2: Real,
) {
    let nzny = dims.nzny();
    let nz = dims.nz;
    let checker = scheme == Scheme::FccCheckerboard;

    u0.par_chunks_mut(nzny)
        .enumerate()
        .skip(1)
        .take(dims.nx - 2)
        .for_each(|(ix, slab)| {
            for iy in 1..dims.ny - 1 {
                let row = iy * nz;
                // checkerboard activates every other z cell, with the
                // start parity set by ix + iy
                let mut iz = if checker { 2 - (ix + iy) % 2 } else { 1 };
                let step = if checker { 2 } else { 1 };
                while iz < nz - 1 {
                    let loc = row + iz;
                    let ii = ix * nzny + loc;
                    if !mask_get(bn_mask, ii) {
                        let mut partial = a1 * u1[ii] - slab[loc];
                        partial += a2 * u1[ii + nzny + nz];
                        partial += a2 * u1[ii - nzny - nz];
                        partial += a2 * u1[ii + nz + 1];
                        partial += a2 * u1[ii - nz - 1];
                        partial += a2 * u1[ii + nzny + 1];
                        partial += a2 * u1[ii - nzny - 1];
                        partial += a2 * u1[ii + nzny - nz];
                        partial += a2 * u1[ii - nzny + nz];
                        partial += a2 * u1[ii + nz - 1];
                        partial += a2 * u1[ii - nz + 1];
                        partial += a2 * u1[ii + nzny - 1];
                        partial += a2 * u1[ii - nzny + 1];
                        slab[loc] = partial;
                    }
                    iz += step;
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::mask_len;

    fn dims4() -> GridDims {
        GridDims { nx: 4, ny: 4, nz: 4 }
    }

    #[test]
    fn test_cart_single_cell() {
        let dims = GridDims { nx: 3, ny: 3, nz: 3 };
        let mask = vec![0u8; mask_len(dims.npts())];
        let mut u0 = vec![0.0; dims.npts()];
        let mut u1 = vec![0.0; dims.npts()];
        let c = dims.idx(1, 1, 1);

        u1[c] = 1.0;
        u0[c] = 0.25;
        u1[dims.idx(2, 1, 1)] = 0.5;
        u1[dims.idx(1, 0, 1)] = 0.5;

        let (a1, a2) = (0.5, 0.25);
        step_air(&mut u0, &u1, &mask, &dims, Scheme::Cartesian, a1, a2);

        // a1*1.0 - 0.25 + a2*(0.5 + 0.5)
        assert!((u0[c] - 0.5).abs() < 1e-6, "got {}", u0[c]);
    }

    #[test]
    fn test_masked_cell_skipped() {
        let dims = dims4();
        let mut mask = vec![0u8; mask_len(dims.npts())];
        let target = dims.idx(1, 1, 1);
        crate::grid::mask_set(&mut mask, target);

        let mut u0 = vec![0.0; dims.npts()];
        let u1 = vec![1.0; dims.npts()];
        u0[target] = 7.0;

        step_air(&mut u0, &u1, &mask, &dims, Scheme::Cartesian, 0.5, 0.25);
        assert_eq!(u0[target], 7.0);
        assert_ne!(u0[dims.idx(2, 2, 2)], 0.0);
    }

    #[test]
    fn test_outer_ring_untouched() {
        let dims = dims4();
        let mask = vec![0u8; mask_len(dims.npts())];
        let mut u0 = vec![0.0; dims.npts()];
        let u1 = vec![1.0; dims.npts()];

        step_air(&mut u0, &u1, &mask, &dims, Scheme::Cartesian, 0.5, 0.25);
        for ii in 0..dims.npts() {
            if dims.on_outer_ring(ii) {
                assert_eq!(u0[ii], 0.0);
            }
        }
    }

    #[test]
    fn test_checkerboard_parity() {
        let dims = GridDims { nx: 6, ny: 6, nz: 6 };
        let mask = vec![0u8; mask_len(dims.npts())];
        let mut u0 = vec![0.0; dims.npts()];
        let u1 = vec![1.0; dims.npts()];

        step_air(&mut u0, &u1, &mask, &dims, Scheme::FccCheckerboard, 0.5, 0.25);

        for ix in 1..5 {
            for iy in 1..5 {
                for iz in 1..5 {
                    let ii = dims.idx(ix, iy, iz);
                    if (ix + iy + iz) % 2 == 0 {
                        assert_ne!(u0[ii], 0.0, "active cell {:?}", (ix, iy, iz));
                    } else {
                        assert_eq!(u0[ii], 0.0, "inactive cell {:?}", (ix, iy, iz));
                    }
                }
            }
        }
    }

    #[test]
    fn test_folded_visits_every_interior_cell() {
        let dims = GridDims { nx: 5, ny: 5, nz: 5 };
        let mask = vec![0u8; mask_len(dims.npts())];
        let mut u0 = vec![0.0; dims.npts()];
        let u1 = vec![1.0; dims.npts()];

        step_air(&mut u0, &u1, &mask, &dims, Scheme::FccFolded, 0.5, 0.25);

        for ix in 1..4 {
            for iy in 1..4 {
                for iz in 1..4 {
                    assert_ne!(u0[dims.idx(ix, iy, iz)], 0.0);
                }
            }
        }
    }
}
