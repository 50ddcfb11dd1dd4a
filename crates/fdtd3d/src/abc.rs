//! First-order absorbing boundary termination.
//!
//! ABC nodes sit where the halo mirror would otherwise enforce a rigid
//! outer wall. The pressure at each node is snapshotted before the air
//! update, and afterwards the freshly written value is relaxed toward
//! that snapshot. Combined with the mirror image this realises a
//! dissipative first-order Engquist-Majda condition, scaled by the node
//! class Q (1 wall, 2 edge, 3 corner).

use crate::Real;

/// Capture the pre-update pressure at every ABC node.
///
/// `u` is the buffer the air stencil is about to overwrite.
pub fn snapshot(u2ba: &mut [Real], u: &[Real], bna_ixyz: &[i64]) {
    for (nb, &ib) in bna_ixyz.iter().enumerate() {
        u2ba[nb] = u[ib as usize];
    }
}

/// Apply the absorbing correction after the air update.
///
/// The Courant number is carried in double precision and the correction
/// is evaluated in double regardless of the field precision.
pub fn apply(u0: &mut [Real], u2ba: &[Real], bna_ixyz: &[i64], q_bna: &[i8], l: f64) {
    for (nb, &ib) in bna_ixyz.iter().enumerate() {
        let lq = l * q_bna[nb] as f64;
        let ib = ib as usize;
        u0[ib] = ((u0[ib] as f64 + lq * u2ba[nb] as f64) / (1.0 + lq)) as Real;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_listed_cells() {
        let u: Vec<Real> = (0..10).map(|i| i as Real).collect();
        let mut u2ba = vec![0.0; 3];
        snapshot(&mut u2ba, &u, &[7, 2, 9]);
        assert_eq!(u2ba, vec![7.0, 2.0, 9.0]);
    }

    #[test]
    fn test_apply_formula() {
        let mut u0: Vec<Real> = vec![1.0, 1.0, 1.0];
        let u2ba: Vec<Real> = vec![0.5, 0.5, 0.5];
        let l = 0.5;

        apply(&mut u0, &u2ba, &[0, 1, 2], &[1, 2, 3], l);

        for (i, &q) in [1.0f64, 2.0, 3.0].iter().enumerate() {
            let lq = l * q;
            let expect = ((1.0 + lq * 0.5) / (1.0 + lq)) as Real;
            assert!((u0[i] - expect).abs() < 1e-6, "q={} got {}", q, u0[i]);
        }
    }

    #[test]
    fn test_steady_state_is_fixed_point() {
        // if the field did not change, the correction must not either
        let mut u0: Vec<Real> = vec![0.25];
        let u2ba: Vec<Real> = vec![0.25];
        apply(&mut u0, &u2ba, &[0], &[1], 0.7);
        assert!((u0[0] - 0.25).abs() < 1e-6);
    }
}
