//! Halo manager: one-cell mirror ring at the six outer faces.
//!
//! Before each air update, the previous-step buffer is patched so that
//! every outer-face cell holds the value of the cell two layers in. The
//! air stencil then sees a Neumann image across the wall; the ABC pass
//! later converts that reflection into absorption at designated nodes.
//!
//! Face order is z, then y, then x. Edge and corner cells are written
//! more than once and the last writer wins, so the order is part of the
//! contract.

use crate::grid::{GridDims, Scheme};
use crate::Real;

/// Mirror all outer faces of `u` in place.
///
/// On the folded FCC grid the `iy = Ny-1` face is copied from `Ny-2`
/// (one layer in, not two) before the z faces, and the normal top-y
/// mirror is suppressed. The half-offset lattice folds onto itself at
/// that face, so the image plane sits half a cell closer.
pub fn mirror_halo(u: &mut [Real], dims: &GridDims, scheme: Scheme) {
    let nx = dims.nx;
    let ny = dims.ny;
    let nz = dims.nz;
    let nzny = dims.nzny();

    if scheme == Scheme::FccFolded {
        for ix in 0..nx {
            let top = ix * nzny + (ny - 1) * nz;
            let inner = ix * nzny + (ny - 2) * nz;
            for iz in 0..nz {
                u[top + iz] = u[inner + iz];
            }
        }
    }

    // z faces
    for ix in 0..nx {
        for iy in 0..ny {
            let row = ix * nzny + iy * nz;
            u[row] = u[row + 2];
            u[row + nz - 1] = u[row + nz - 3];
        }
    }

    // y faces
    for ix in 0..nx {
        let slab = ix * nzny;
        for iz in 0..nz {
            u[slab + iz] = u[slab + 2 * nz + iz];
        }
    }
    if scheme != Scheme::FccFolded {
        for ix in 0..nx {
            let slab = ix * nzny;
            for iz in 0..nz {
                u[slab + (ny - 1) * nz + iz] = u[slab + (ny - 3) * nz + iz];
            }
        }
    }

    // x faces
    for iy in 0..ny {
        for iz in 0..nz {
            let row = iy * nz + iz;
            u[row] = u[2 * nzny + row];
            u[(nx - 1) * nzny + row] = u[(nx - 3) * nzny + row];
        }
    }
}
