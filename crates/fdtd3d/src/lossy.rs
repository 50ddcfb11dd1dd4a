//! Frequency-dependent lossy boundary: per-material RLC branches with
//! auxiliary state.
//!
//! Each lossy node references a material; a material is an admittance
//! scale beta plus up to [`MMB`] second-order resonator branches. Every
//! node keeps two state scalars per branch (`vh1`, `gh1`) that live for
//! the whole run and are touched only here.
//!
//! The update has three parts: a base correction from beta alone, a
//! branch correction read against last sample's state, and the state
//! advance. The two branch loops must stay separate: the correction
//! reads `vh1`/`gh1` as they were at the previous sample, and the
//! advance's writes must not be visible to it.

use serde::{Deserialize, Serialize};

use rayon::prelude::*;

use crate::Real;

/// Compile-time maximum RLC branches per material.
pub const MMB: usize = 12;

/// Maximum number of materials a scene may declare.
pub const MAX_MATERIALS: usize = 64;

/// Precomputed coefficients of one RLC branch.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct MatQuad {
    /// Branch gain
    pub b: Real,
    /// b * d
    pub bd: Real,
    /// b * D-hat
    #[serde(rename = "bDh")]
    pub b_dh: Real,
    /// b * F-hat
    #[serde(rename = "bFh")]
    pub b_fh: Real,
}

/// Advance every lossy boundary node one sample.
///
/// `u0b` holds the node pressures gathered after the rigid pass and is
/// rewritten in place; `u2b` is the shadow from two samples ago. State
/// slabs `vh1`/`gh1` are `MMB` scalars per node, so each worker owns a
/// disjoint chunk.
#[allow(clippy::too_many_arguments)]
pub fn step_lossy(
    u0b: &mut [Real],
    u2b: &[Real],
    ssaf_bnl: &[Real],
    mat_bnl: &[i8],
    mb: &[i8],
    lo2: Real,
    vh1: &mut [Real],
    gh1: &mut [Real],
    mat_quads: &[MatQuad],
    mat_beta: &[Real],
) {
    u0b.par_iter_mut()
        .zip(u2b.par_iter())
        .zip(vh1.par_chunks_mut(MMB))
        .zip(gh1.par_chunks_mut(MMB))
        .enumerate()
        .for_each(|(nb, (((u0b, &u2b), vh), gh))| {
            let k = mat_bnl[nb] as usize;
            let ssaf = ssaf_bnl[nb];
            let lo2_kbg = lo2 * ssaf * mat_beta[k];
            let fac = 2.0 * lo2 * ssaf / (1.0 + lo2_kbg);

            let mut u0 = *u0b;
            u0 = (u0 + lo2_kbg * u2b) / (1.0 + lo2_kbg);

            let quads = &mat_quads[k * MMB..k * MMB + mb[k] as usize];

            // branch correction against last sample's state
            let mut vh_prev: [Real; MMB] = [0.0; MMB];
            for (m, quad) in quads.iter().enumerate() {
                vh_prev[m] = vh[m];
                u0 -= fac * (2.0 * quad.b_dh * vh_prev[m] - quad.b_fh * gh[m]);
            }

            // state advance, invisible to the correction above
            let du = u0 - u2b;
            for (m, quad) in quads.iter().enumerate() {
                let vh_new = quad.b * du + quad.bd * vh_prev[m] - 2.0 * quad.b_fh * gh[m];
                gh[m] += (vh_new + vh_prev[m]) / 2.0;
                vh[m] = vh_new;
            }

            *u0b = u0;
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_branches_is_pure_base_correction() {
        let mut u0b = vec![1.0 as Real];
        let u2b = vec![0.5 as Real];
        let mut vh1 = vec![0.0; MMB];
        let mut gh1 = vec![0.0; MMB];
        let quads = vec![MatQuad::default(); MMB];

        let lo2: Real = 0.25;
        let ssaf: Real = 2.0;
        let beta: Real = 1.5;
        step_lossy(
            &mut u0b,
            &u2b,
            &[ssaf],
            &[0],
            &[0],
            lo2,
            &mut vh1,
            &mut gh1,
            &quads,
            &[beta],
        );

        let g = lo2 * ssaf * beta;
        let expect = (1.0 + g * 0.5) / (1.0 + g);
        assert!((u0b[0] - expect).abs() < 1e-6, "got {}", u0b[0]);
        assert!(vh1.iter().all(|&v| v == 0.0));
        assert!(gh1.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_single_branch_two_samples() {
        // hand-computed two-sample run of one node with one branch
        let lo2: Real = 0.5;
        let ssaf: Real = 1.0;
        let beta: Real = 0.0; // isolate the branch path
        let quad = MatQuad { b: 0.5, bd: 0.25, b_dh: 0.2, b_fh: 0.1 };

        let mut quads = vec![MatQuad::default(); MMB];
        quads[0] = quad;
        let mut vh1 = vec![0.0; MMB];
        let mut gh1 = vec![0.0; MMB];

        // sample 1: state is zero, so the correction is a no-op and
        // only the advance fires
        let mut u0b = vec![1.0 as Real];
        let u2b = vec![0.0 as Real];
        step_lossy(
            &mut u0b,
            &u2b,
            &[ssaf],
            &[0],
            &[1],
            lo2,
            &mut vh1,
            &mut gh1,
            &quads,
            &[beta],
        );
        assert!((u0b[0] - 1.0).abs() < 1e-6);
        // vh = b*du = 0.5, gh = (0.5 + 0)/2 = 0.25
        assert!((vh1[0] - 0.5).abs() < 1e-6);
        assert!((gh1[0] - 0.25).abs() < 1e-6);

        // sample 2: the correction now sees the sample-1 state
        let fac = 2.0 * lo2 * ssaf;
        let mut u0 = 0.8 as Real;
        let u2 = 0.3 as Real;
        let corrected = u0 - fac * (2.0 * quad.b_dh * 0.5 - quad.b_fh * 0.25);
        let du = corrected - u2;
        let vh_expect = quad.b * du + quad.bd * 0.5 - 2.0 * quad.b_fh * 0.25;
        let gh_expect = 0.25 + (vh_expect + 0.5) / 2.0;

        let mut u0b = vec![u0];
        let u2b = vec![u2];
        step_lossy(
            &mut u0b,
            &u2b,
            &[ssaf],
            &[0],
            &[1],
            lo2,
            &mut vh1,
            &mut gh1,
            &quads,
            &[beta],
        );
        u0 = u0b[0];
        assert!((u0 - corrected).abs() < 1e-6, "got {}", u0);
        assert!((vh1[0] - vh_expect).abs() < 1e-6, "got {}", vh1[0]);
        assert!((gh1[0] - gh_expect).abs() < 1e-6, "got {}", gh1[0]);
    }

    #[test]
    fn test_base_correction_is_dissipative() {
        // with positive beta the corrected value moves toward the old
        // pressure, never past it
        let mut u0b = vec![1.0 as Real];
        let u2b = vec![-1.0 as Real];
        let mut vh1 = vec![0.0; MMB];
        let mut gh1 = vec![0.0; MMB];
        let quads = vec![MatQuad::default(); MMB];

        step_lossy(
            &mut u0b,
            &u2b,
            &[1.0],
            &[0],
            &[0],
            0.25,
            &mut vh1,
            &mut gh1,
            &quads,
            &[2.0],
        );
        assert!(u0b[0] < 1.0 && u0b[0] > -1.0, "got {}", u0b[0]);
    }

    #[test]
    fn test_per_node_state_is_independent() {
        let mut u0b = vec![1.0 as Real, 0.0];
        let u2b = vec![0.0 as Real, 0.0];
        let mut vh1 = vec![0.0; 2 * MMB];
        let mut gh1 = vec![0.0; 2 * MMB];
        let mut quads = vec![MatQuad::default(); MMB];
        quads[0] = MatQuad { b: 1.0, bd: 0.0, b_dh: 0.0, b_fh: 0.0 };

        step_lossy(
            &mut u0b,
            &u2b,
            &[1.0, 1.0],
            &[0, 0],
            &[1],
            0.25,
            &mut vh1,
            &mut gh1,
            &quads,
            &[0.0],
        );

        // node 0 saw du = 1, node 1 saw du = 0
        assert!((vh1[0] - 1.0).abs() < 1e-6);
        assert_eq!(vh1[MMB], 0.0);
    }
}
