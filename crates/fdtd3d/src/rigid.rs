//! Rigid-boundary stencil: adjacency-masked update at solid boundary
//! nodes.
//!
//! Each boundary node carries a bit word saying which of its stencil
//! neighbours are fluid-side. The update is the interior leapfrog with
//! the centre weight reduced to the live-neighbour count K and each
//! neighbour gated by its bit. The gather is branch-free: the bit is
//! widened to 0.0 or 1.0 and multiplied in, keeping the summation order
//! identical for every node.

use rayon::prelude::*;

use crate::grid::{cart_offsets, fcc_offsets, GridDims, Scheme};
use crate::Real;

/// Overwrite the current buffer at every rigid boundary node.
///
/// New values are computed in parallel into `scratch` (one slot per
/// node, resized here) and scattered serially, so the phase is
/// deterministic and no two writers alias.
pub fn step_rigid(
    u0: &mut [Real],
    u1: &[Real],
    bn_ixyz: &[i64],
    adj_bn: &[u16],
    dims: &GridDims,
    scheme: Scheme,
    sl2: Real,
    a2: Real,
    scratch: &mut Vec<Real>,
) {
    scratch.resize(bn_ixyz.len(), 0.0);
    match scheme {
        Scheme::Cartesian => {
            let offsets = cart_offsets(dims);
            gather(u0, u1, bn_ixyz, adj_bn, &offsets, sl2, a2, scratch);
        }
        _ => {
            let offsets = fcc_offsets(dims);
            gather(u0, u1, bn_ixyz, adj_bn, &offsets, sl2, a2, scratch);
        }
    }
    for (nb, &val) in scratch.iter().enumerate() {
        u0[bn_ixyz[nb] as usize] = val;
    }
}

fn gather(
    u0: &[Real],
    u1: &[Real],
    bn_ixyz: &[i64],
    adj_bn: &[u16],
    offsets: &[i64],
    sl2: Real,
    a2: Real,
    scratch: &mut [Real],
) {
    scratch.par_iter_mut().enumerate().for_each(|(nb, out)| {
        let ii = bn_ixyz[nb] as usize;
        let adj = adj_bn[nb];
        let k = adj.count_ones() as Real;
        let b1: Real = 2.0 - sl2 * k;

        let mut partial = b1 * u1[ii] - u0[ii];
        for (j, &off) in offsets.iter().enumerate() {
            let gate = ((adj >> j) & 1) as Real;
            partial += a2 * gate * u1[(ii as i64 + off) as usize];
        }
        *out = partial;
    });
}
