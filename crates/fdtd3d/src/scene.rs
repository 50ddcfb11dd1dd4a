//! Scene data model and contract validation.
//!
//! A [`Scene`] is the fully materialised input of one run: grid
//! geometry, boundary-node registries, material registry, source
//! signals and receiver locations. Field names follow the on-disk
//! dataset names, so loaders can map a hierarchical container onto the
//! struct per field.
//!
//! The engine itself has no recoverable errors; everything that could
//! go wrong is checked here before the first sample.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{self, GridDims, Scheme};
use crate::lossy::{MatQuad, MAX_MATERIALS, MMB};
use crate::Real;

/// Fatal input-contract violations, detected before the loop starts.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("dataset {name} has {got} entries, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("{name}[{at}] = {index} outside grid of {npts} cells")]
    IndexOutOfRange {
        name: &'static str,
        at: usize,
        index: i64,
        npts: usize,
    },

    #[error("{name}[{at}] = {index} lies on the outer cell ring")]
    IndexOnOuterRing {
        name: &'static str,
        at: usize,
        index: i64,
    },

    #[error("grid {nx}x{ny}x{nz} too small for a mirror halo")]
    GridTooSmall { nx: i64, ny: i64, nz: i64 },

    #[error("{name} = {got} is not a valid count")]
    BadCount { name: &'static str, got: i64 },

    #[error("invalid scheme flag {0}")]
    BadSchemeFlag(i8),

    #[error("courant number l = {l} unstable for {scheme:?} (l^2 limit {limit})")]
    CourantUnstable { l: f64, scheme: Scheme, limit: f64 },

    #[error("scene declares {got} materials, maximum is {max}", max = MAX_MATERIALS)]
    TooManyMaterials { got: i8 },

    #[error("material {mat} declares {got} branches, maximum is {max}", max = MMB)]
    TooManyBranches { mat: usize, got: i8 },

    #[error("non-finite value in {name}")]
    NonFinite { name: &'static str },

    #[error("Q_bna[{at}] = {q}, expected 1, 2 or 3")]
    BadAbcClass { at: usize, q: i8 },

    #[error("adj_bn[{at}] = {adj:#06x} sets bits beyond the {nn}-neighbour stencil")]
    BadAdjacency { at: usize, adj: u16, nn: usize },

    #[error("mat_bnl[{at}] = {mat} outside material registry of {nm}")]
    BadMaterialIndex { at: usize, mat: i8, nm: i8 },

    #[error("bn_mask disagrees with the boundary registries at cell {ii}")]
    MaskMismatch { ii: usize },
}

/// Everything the engine needs for one run.
///
/// Linear cell indices use `ii = ix * Ny * Nz + iy * Nz + iz` with `iz`
/// contiguous. `in_sigs` is `Ns * Nt` time-major per source, and the
/// receiver series produced from `out_ixyz` is `Nr * Nt` time-major per
/// receiver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    #[serde(rename = "Nx")]
    pub nx: i64,
    #[serde(rename = "Ny")]
    pub ny: i64,
    #[serde(rename = "Nz")]
    pub nz: i64,
    #[serde(rename = "Nt")]
    pub nt: i64,
    #[serde(rename = "Ns")]
    pub ns: i64,
    #[serde(rename = "Nr")]
    pub nr: i64,
    #[serde(rename = "Nb")]
    pub nb: i64,
    #[serde(rename = "Nbl")]
    pub nbl: i64,
    #[serde(rename = "Nba")]
    pub nba: i64,
    #[serde(rename = "Nm")]
    pub nm: i8,

    /// Courant number, kept in double precision.
    pub l: f64,
    /// l squared.
    pub l2: f64,
    /// Scheme-scaled l^2 in working precision (rigid centre weight).
    pub sl2: Real,
    /// l / 2 in working precision (lossy admittance scale).
    pub lo2: Real,
    /// Interior stencil centre weight.
    pub a1: Real,
    /// Interior stencil neighbour weight.
    pub a2: Real,
    /// 0 Cartesian, 1 FCC checkerboard, 2 FCC folded.
    pub fcc_flag: i8,

    /// Branch count per material.
    #[serde(rename = "Mb")]
    pub mb: Vec<i8>,
    /// Admittance scale per material.
    pub mat_beta: Vec<Real>,
    /// RLC coefficients, `Nm * MMB` with only the first `Mb[k]` of each
    /// row meaningful.
    pub mat_quads: Vec<MatQuad>,

    /// Rigid boundary nodes.
    pub bn_ixyz: Vec<i64>,
    /// Lossy boundary nodes; may repeat entries of `bn_ixyz`.
    pub bnl_ixyz: Vec<i64>,
    /// ABC termination nodes.
    pub bna_ixyz: Vec<i64>,
    /// ABC node class: 1 wall, 2 edge, 3 corner.
    #[serde(rename = "Q_bna")]
    pub q_bna: Vec<i8>,
    /// Fluid-side adjacency word per rigid node.
    pub adj_bn: Vec<u16>,
    /// Bit-per-cell boundary mask the air pass skips on.
    pub bn_mask: Vec<u8>,
    /// Material index per lossy node.
    pub mat_bnl: Vec<i8>,
    /// Surface-area fraction (volume scaled) per lossy node.
    pub ssaf_bnl: Vec<Real>,

    /// Source cells.
    pub in_ixyz: Vec<i64>,
    /// Source signals, `Ns * Nt`, double precision.
    pub in_sigs: Vec<f64>,
    /// Receiver cells.
    pub out_ixyz: Vec<i64>,
}

impl Scene {
    /// Grid dimensions of this scene.
    pub fn dims(&self) -> GridDims {
        GridDims {
            nx: self.nx as usize,
            ny: self.ny as usize,
            nz: self.nz as usize,
        }
    }

    /// Total cell count.
    pub fn npts(&self) -> usize {
        self.dims().npts()
    }

    /// Decode the scheme flag.
    pub fn scheme(&self) -> Result<Scheme, ContractViolation> {
        Scheme::from_flag(self.fcc_flag).ok_or(ContractViolation::BadSchemeFlag(self.fcc_flag))
    }

    /// Check every input contract the engine relies on.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        let scheme = self.scheme()?;

        // the halo mirror reads two layers in, so every axis needs at
        // least three cells
        if self.nx < 3 || self.ny < 3 || self.nz < 3 {
            return Err(ContractViolation::GridTooSmall {
                nx: self.nx,
                ny: self.ny,
                nz: self.nz,
            });
        }
        for (name, got) in [
            ("Nt", self.nt),
            ("Ns", self.ns),
            ("Nr", self.nr),
            ("Nb", self.nb),
            ("Nbl", self.nbl),
            ("Nba", self.nba),
        ] {
            if got < 0 {
                return Err(ContractViolation::BadCount { name, got });
            }
        }

        let dims = self.dims();
        let npts = dims.npts();

        let limit = scheme.max_l2();
        if !self.l.is_finite() || self.l <= 0.0 || self.l * self.l > limit + 1e-9 {
            return Err(ContractViolation::CourantUnstable { l: self.l, scheme, limit });
        }
        for (name, value) in [
            ("l2", self.l2),
            ("sl2", self.sl2 as f64),
            ("lo2", self.lo2 as f64),
            ("a1", self.a1 as f64),
            ("a2", self.a2 as f64),
        ] {
            if !value.is_finite() {
                return Err(ContractViolation::NonFinite { name });
            }
        }

        self.check_shapes(npts)?;
        self.check_materials()?;
        self.check_indices(&dims)?;
        self.check_mask(npts)?;
        Ok(())
    }

    fn check_shapes(&self, npts: usize) -> Result<(), ContractViolation> {
        let expect = |name: &'static str, got: usize, expected: usize| {
            if got == expected {
                Ok(())
            } else {
                Err(ContractViolation::ShapeMismatch { name, got, expected })
            }
        };
        let nb = self.nb as usize;
        let nbl = self.nbl as usize;
        let nba = self.nba as usize;
        let nm = self.nm as usize;

        expect("bn_ixyz", self.bn_ixyz.len(), nb)?;
        expect("adj_bn", self.adj_bn.len(), nb)?;
        expect("bnl_ixyz", self.bnl_ixyz.len(), nbl)?;
        expect("mat_bnl", self.mat_bnl.len(), nbl)?;
        expect("ssaf_bnl", self.ssaf_bnl.len(), nbl)?;
        expect("bna_ixyz", self.bna_ixyz.len(), nba)?;
        expect("Q_bna", self.q_bna.len(), nba)?;
        expect("Mb", self.mb.len(), nm)?;
        expect("mat_beta", self.mat_beta.len(), nm)?;
        expect("mat_quads", self.mat_quads.len(), nm * MMB)?;
        expect("in_ixyz", self.in_ixyz.len(), self.ns as usize)?;
        expect(
            "in_sigs",
            self.in_sigs.len(),
            self.ns as usize * self.nt as usize,
        )?;
        expect("out_ixyz", self.out_ixyz.len(), self.nr as usize)?;
        expect("bn_mask", self.bn_mask.len(), grid::mask_len(npts))?;
        Ok(())
    }

    fn check_materials(&self) -> Result<(), ContractViolation> {
        if self.nm < 0 || self.nm as usize > MAX_MATERIALS {
            return Err(ContractViolation::TooManyMaterials { got: self.nm });
        }
        for (mat, &mb) in self.mb.iter().enumerate() {
            if mb < 0 || mb as usize > MMB {
                return Err(ContractViolation::TooManyBranches { mat, got: mb });
            }
        }
        if self.mat_beta.iter().any(|b| !(*b as f64).is_finite()) {
            return Err(ContractViolation::NonFinite { name: "mat_beta" });
        }
        let finite = |v: Real| (v as f64).is_finite();
        for quad in &self.mat_quads {
            if !finite(quad.b) || !finite(quad.bd) || !finite(quad.b_dh) || !finite(quad.b_fh) {
                return Err(ContractViolation::NonFinite { name: "mat_quads" });
            }
        }
        if self.ssaf_bnl.iter().any(|s| !(*s as f64).is_finite()) {
            return Err(ContractViolation::NonFinite { name: "ssaf_bnl" });
        }
        for (at, &mat) in self.mat_bnl.iter().enumerate() {
            if mat < 0 || mat >= self.nm {
                return Err(ContractViolation::BadMaterialIndex { at, mat, nm: self.nm });
            }
        }
        Ok(())
    }

    fn check_indices(&self, dims: &GridDims) -> Result<(), ContractViolation> {
        let npts = dims.npts();
        // ABC nodes may sit on the outer ring; everything else stays off
        // it
        let registries: [(&'static str, &[i64], bool); 5] = [
            ("bn_ixyz", &self.bn_ixyz, false),
            ("bnl_ixyz", &self.bnl_ixyz, false),
            ("bna_ixyz", &self.bna_ixyz, true),
            ("in_ixyz", &self.in_ixyz, false),
            ("out_ixyz", &self.out_ixyz, false),
        ];
        for (name, ixyz, ring_ok) in registries {
            for (at, &index) in ixyz.iter().enumerate() {
                if index < 0 || index as usize >= npts {
                    return Err(ContractViolation::IndexOutOfRange { name, at, index, npts });
                }
                if !ring_ok && dims.on_outer_ring(index as usize) {
                    return Err(ContractViolation::IndexOnOuterRing { name, at, index });
                }
            }
        }

        let nn = self.scheme()?.neighbor_count();
        for (at, &adj) in self.adj_bn.iter().enumerate() {
            if adj >> nn != 0 {
                return Err(ContractViolation::BadAdjacency { at, adj, nn });
            }
        }
        for (at, &q) in self.q_bna.iter().enumerate() {
            if !(1..=3).contains(&q) {
                return Err(ContractViolation::BadAbcClass { at, q });
            }
        }
        Ok(())
    }

    fn check_mask(&self, npts: usize) -> Result<(), ContractViolation> {
        let mut expect = vec![0u8; grid::mask_len(npts)];
        for &ii in self.bn_ixyz.iter().chain(&self.bnl_ixyz) {
            grid::mask_set(&mut expect, ii as usize);
        }
        if expect != self.bn_mask {
            for ii in 0..npts {
                if grid::mask_get(&expect, ii) != grid::mask_get(&self.bn_mask, ii) {
                    return Err(ContractViolation::MaskMismatch { ii });
                }
            }
        }
        Ok(())
    }
}
