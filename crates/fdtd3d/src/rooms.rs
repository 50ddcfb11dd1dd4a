//! Shoebox room scenes for tests, demos and benchmarks.
//!
//! Builds complete [`Scene`]s for a rectangular room: stencil
//! coefficients for the chosen scheme, boundary-node registries with
//! adjacency masks, ABC classification, a material registry for lossy
//! walls, and source/receiver tables. Production scenes come from an
//! external voxelizer; this builder covers the geometry every test and
//! demo needs.

use crate::grid::{self, GridDims, Scheme};
use crate::lossy::{MatQuad, MMB};
use crate::scene::Scene;
use crate::Real;

/// Treatment applied to all six outer walls.
#[derive(Clone, Debug, PartialEq)]
pub enum WallTreatment {
    /// Rigid walls through halo mirroring alone; no boundary nodes.
    Mirror,
    /// Rigid walls as adjacency-masked boundary nodes.
    Rigid,
    /// First-order absorbing termination on every face.
    Absorbing,
    /// Frequency-dependent lossy material on every face. The walls are
    /// also rigid boundary nodes; the lossy pass corrects them.
    Lossy { beta: Real, quads: Vec<MatQuad> },
}

/// A rectangular room on a full grid of `nx * ny * nz` cells.
///
/// The outermost cell ring is the halo; the first interior layer is
/// where wall boundary nodes live. Sources and receivers must sit in
/// the interior.
#[derive(Clone, Debug)]
pub struct ShoeboxRoom {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub nt: usize,
    /// Courant number; must respect the scheme's stability limit.
    pub l: f64,
    pub scheme: Scheme,
    pub walls: WallTreatment,
    sources: Vec<(usize, usize, usize, Vec<f64>)>,
    receivers: Vec<(usize, usize, usize)>,
}

impl ShoeboxRoom {
    /// A Cartesian room with mirror walls and a conservative Courant
    /// number.
    pub fn new(nx: usize, ny: usize, nz: usize, nt: usize) -> Self {
        assert!(nx >= 5 && ny >= 5 && nz >= 5, "room too small for a halo");
        Self {
            nx,
            ny,
            nz,
            nt,
            l: 0.5,
            scheme: Scheme::Cartesian,
            walls: WallTreatment::Mirror,
            sources: Vec::new(),
            receivers: Vec::new(),
        }
    }

    fn dims(&self) -> GridDims {
        GridDims { nx: self.nx, ny: self.ny, nz: self.nz }
    }

    fn assert_interior(&self, ix: usize, iy: usize, iz: usize) {
        assert!(
            ix >= 1 && ix < self.nx - 1 && iy >= 1 && iy < self.ny - 1 && iz >= 1 && iz < self.nz - 1,
            "cell ({}, {}, {}) is not interior",
            ix,
            iy,
            iz
        );
    }

    /// Add a source cell with its signal; the signal is padded or
    /// truncated to `nt` samples.
    pub fn add_source(&mut self, ix: usize, iy: usize, iz: usize, signal: Vec<f64>) {
        self.assert_interior(ix, iy, iz);
        self.sources.push((ix, iy, iz, signal));
    }

    /// Add a receiver cell.
    pub fn add_receiver(&mut self, ix: usize, iy: usize, iz: usize) {
        self.assert_interior(ix, iy, iz);
        self.receivers.push((ix, iy, iz));
    }

    /// True if the cell is on the first interior layer next to a wall.
    fn on_wall_layer(&self, ix: usize, iy: usize, iz: usize) -> bool {
        ix == 1
            || ix == self.nx - 2
            || iy == 1
            || iy == self.ny - 2
            || iz == 1
            || iz == self.nz - 2
    }

    /// True if the checkerboard lattice updates this cell.
    fn lattice_active(&self, ix: usize, iy: usize, iz: usize) -> bool {
        self.scheme != Scheme::FccCheckerboard || (ix + iy + iz) % 2 == 0
    }

    fn wall_layer_cells(&self) -> Vec<(usize, usize, usize)> {
        let mut cells = Vec::new();
        for ix in 1..self.nx - 1 {
            for iy in 1..self.ny - 1 {
                for iz in 1..self.nz - 1 {
                    if self.on_wall_layer(ix, iy, iz) && self.lattice_active(ix, iy, iz) {
                        cells.push((ix, iy, iz));
                    }
                }
            }
        }
        cells
    }

    /// Adjacency word: bit j is set when the j-th canonical neighbour
    /// stays inside the interior box.
    fn adjacency(&self, ix: usize, iy: usize, iz: usize) -> u16 {
        let dirs: &[[i64; 3]] = if self.scheme.is_fcc() {
            &grid::FCC_NEIGHBORS
        } else {
            &grid::CART_NEIGHBORS
        };
        let mut adj = 0u16;
        for (j, dir) in dirs.iter().enumerate() {
            let jx = ix as i64 + dir[0];
            let jy = iy as i64 + dir[1];
            let jz = iz as i64 + dir[2];
            let inside = jx >= 1
                && jx <= self.nx as i64 - 2
                && jy >= 1
                && jy <= self.ny as i64 - 2
                && jz >= 1
                && jz <= self.nz as i64 - 2;
            if inside {
                adj |= 1 << j;
            }
        }
        adj
    }

    /// ABC class: how many axes pin this cell to a wall layer.
    fn abc_class(&self, ix: usize, iy: usize, iz: usize) -> i8 {
        let mut q = 0;
        if ix == 1 || ix == self.nx - 2 {
            q += 1;
        }
        if iy == 1 || iy == self.ny - 2 {
            q += 1;
        }
        if iz == 1 || iz == self.nz - 2 {
            q += 1;
        }
        q
    }

    /// Assemble the scene.
    pub fn build(&self) -> Scene {
        let dims = self.dims();
        let l2 = self.l * self.l;
        let (a1, a2, sl2) = match self.scheme {
            Scheme::Cartesian => (2.0 - 6.0 * l2, l2, l2),
            _ => (2.0 - 3.0 * l2, 0.25 * l2, 0.25 * l2),
        };

        let mut bn_ixyz = Vec::new();
        let mut adj_bn = Vec::new();
        let mut bnl_ixyz = Vec::new();
        let mut mat_bnl = Vec::new();
        let mut ssaf_bnl = Vec::new();
        let mut bna_ixyz = Vec::new();
        let mut q_bna = Vec::new();

        let nn = self.scheme.neighbor_count() as u32;
        match &self.walls {
            WallTreatment::Mirror => {}
            WallTreatment::Rigid => {
                for (ix, iy, iz) in self.wall_layer_cells() {
                    bn_ixyz.push(dims.idx(ix, iy, iz) as i64);
                    adj_bn.push(self.adjacency(ix, iy, iz));
                }
            }
            WallTreatment::Absorbing => {
                for (ix, iy, iz) in self.wall_layer_cells() {
                    bna_ixyz.push(dims.idx(ix, iy, iz) as i64);
                    q_bna.push(self.abc_class(ix, iy, iz));
                }
            }
            WallTreatment::Lossy { .. } => {
                for (ix, iy, iz) in self.wall_layer_cells() {
                    let ii = dims.idx(ix, iy, iz) as i64;
                    let adj = self.adjacency(ix, iy, iz);
                    bn_ixyz.push(ii);
                    adj_bn.push(adj);
                    bnl_ixyz.push(ii);
                    mat_bnl.push(0);
                    // one admittance unit per wall-side face
                    ssaf_bnl.push((nn - adj.count_ones()) as Real);
                }
            }
        }

        let (nm, mb, mat_beta, mat_quads) = match &self.walls {
            WallTreatment::Lossy { beta, quads } => {
                assert!(quads.len() <= MMB, "too many RLC branches");
                let mut row = vec![MatQuad::default(); MMB];
                row[..quads.len()].copy_from_slice(quads);
                (1i8, vec![quads.len() as i8], vec![*beta], row)
            }
            _ => (0i8, Vec::new(), Vec::new(), Vec::new()),
        };

        let mut bn_mask = vec![0u8; grid::mask_len(dims.npts())];
        for &ii in bn_ixyz.iter().chain(&bnl_ixyz) {
            grid::mask_set(&mut bn_mask, ii as usize);
        }

        let mut in_ixyz = Vec::new();
        let mut in_sigs = Vec::new();
        for (ix, iy, iz, signal) in &self.sources {
            in_ixyz.push(dims.idx(*ix, *iy, *iz) as i64);
            let mut sig = signal.clone();
            sig.resize(self.nt, 0.0);
            in_sigs.extend_from_slice(&sig);
        }
        let out_ixyz: Vec<i64> = self
            .receivers
            .iter()
            .map(|&(ix, iy, iz)| dims.idx(ix, iy, iz) as i64)
            .collect();

        Scene {
            nx: self.nx as i64,
            ny: self.ny as i64,
            nz: self.nz as i64,
            nt: self.nt as i64,
            ns: self.sources.len() as i64,
            nr: self.receivers.len() as i64,
            nb: bn_ixyz.len() as i64,
            nbl: bnl_ixyz.len() as i64,
            nba: bna_ixyz.len() as i64,
            nm,
            l: self.l,
            l2,
            sl2: sl2 as Real,
            lo2: (0.5 * self.l) as Real,
            a1: a1 as Real,
            a2: a2 as Real,
            fcc_flag: self.scheme.flag(),
            mb,
            mat_beta,
            mat_quads,
            bn_ixyz,
            bnl_ixyz,
            bna_ixyz,
            q_bna,
            adj_bn,
            bn_mask,
            mat_bnl,
            ssaf_bnl,
            in_ixyz,
            in_sigs,
            out_ixyz,
        }
    }
}

/// A Gaussian pulse peaking at `center` with width `sigma`, in samples.
pub fn gaussian_pulse(nt: usize, center: usize, sigma: f64) -> Vec<f64> {
    (0..nt)
        .map(|n| {
            let t = n as f64 - center as f64;
            (-t * t / (2.0 * sigma * sigma)).exp()
        })
        .collect()
}
