//! Driver loop: per-sample orchestration over the shared field buffers.
//!
//! Each sample runs a fixed phase order: ABC snapshot, halo mirror, air
//! stencil, ABC correction, rigid nodes, lossy nodes, receiver readout,
//! source injection, buffer rotation. Every phase consumes the previous
//! one's writes, so the order is part of the contract and must not be
//! rearranged.
//!
//! All buffers are allocated once at construction, zeroed, and live for
//! the whole run. Rotation swaps whole vectors, so no sample copies
//! field data.

use std::time::Instant;

use serde::Serialize;

use crate::grid::{GridDims, Scheme};
use crate::lossy::MMB;
use crate::scene::{ContractViolation, Scene};
use crate::{abc, air, halo, lossy, rigid, Real};

/// Wall-clock accounting for a run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RunStats {
    /// Total time spent stepping.
    pub total_secs: f64,
    /// Time in the air phase (halo, stencil, ABC).
    pub air_secs: f64,
    /// Time in the lossy-boundary integrator.
    pub boundary_secs: f64,
    /// Receiver samples that came out non-finite. The run continues;
    /// a non-zero count is a numerical warning, not an error.
    pub nonfinite_samples: u64,
}

impl RunStats {
    /// Overall throughput in voxels per second.
    pub fn voxel_rate(&self, npts: usize, nt: i64) -> f64 {
        if self.total_secs > 0.0 {
            npts as f64 * nt as f64 / self.total_secs
        } else {
            0.0
        }
    }
}

/// Timing record handed to the progress callback after each sample.
#[derive(Clone, Copy, Debug)]
pub struct SampleTiming {
    /// Sample just completed.
    pub n: i64,
    /// Total samples in the run.
    pub nt: i64,
    /// Wall time of this sample.
    pub sample_secs: f64,
    /// Air-phase share of this sample.
    pub air_secs: f64,
    /// Lossy-boundary share of this sample.
    pub boundary_secs: f64,
    /// Wall time since the engine was built.
    pub elapsed_secs: f64,
    /// Worker threads in the parallel runtime.
    pub workers: usize,
}

/// Receiver series plus timing for a finished run.
#[derive(Clone, Debug, Serialize)]
pub struct RunOutput {
    /// `Nr * Nt`, time-major per receiver, double precision.
    pub u_out: Vec<f64>,
    #[serde(rename = "Nr")]
    pub nr: i64,
    #[serde(rename = "Nt")]
    pub nt: i64,
    pub stats: RunStats,
}

impl RunOutput {
    /// Time series of one receiver.
    pub fn receiver(&self, nr: usize) -> &[f64] {
        let nt = self.nt as usize;
        &self.u_out[nr * nt..(nr + 1) * nt]
    }
}

/// The 3-D FDTD engine: a validated scene plus all working state.
///
/// `u0` is the buffer written during the current sample and `u1` the
/// previous step; the names follow the buffer rotation, so after
/// [`step`](Engine3D::step) returns, `u1` holds the freshly computed
/// field and `u0` the one before it.
pub struct Engine3D {
    pub scene: Scene,
    scheme: Scheme,
    dims: GridDims,

    /// Write buffer for the current sample.
    pub u0: Vec<Real>,
    /// Previous-step field, mirror-patched each sample.
    pub u1: Vec<Real>,

    /// Lossy-node pressure shadows at three time levels.
    pub u0b: Vec<Real>,
    pub u1b: Vec<Real>,
    pub u2b: Vec<Real>,
    /// ABC pre-update snapshot.
    pub u2ba: Vec<Real>,
    /// Branch state, `MMB` per lossy node.
    pub vh1: Vec<Real>,
    pub gh1: Vec<Real>,

    bn_scratch: Vec<Real>,

    /// Receiver series accumulated so far, `Nr * Nt`.
    pub u_out: Vec<f64>,
    /// Next sample to compute.
    pub n: i64,
    pub stats: RunStats,

    started: Instant,
}

impl Engine3D {
    /// Validate the scene and allocate all working state, zeroed.
    pub fn new(scene: Scene) -> Result<Self, ContractViolation> {
        scene.validate()?;
        let scheme = scene.scheme()?;
        let dims = scene.dims();
        let npts = dims.npts();
        let nbl = scene.nbl as usize;

        Ok(Self {
            scheme,
            dims,
            u0: vec![0.0; npts],
            u1: vec![0.0; npts],
            u0b: vec![0.0; nbl],
            u1b: vec![0.0; nbl],
            u2b: vec![0.0; nbl],
            u2ba: vec![0.0; scene.nba as usize],
            vh1: vec![0.0; nbl * MMB],
            gh1: vec![0.0; nbl * MMB],
            bn_scratch: Vec::new(),
            u_out: vec![0.0; scene.nr as usize * scene.nt as usize],
            n: 0,
            stats: RunStats::default(),
            started: Instant::now(),
            scene,
        })
    }

    /// Advance one sample and record one receiver value per output.
    pub fn step(&mut self) -> SampleTiming {
        assert!(
            self.n < self.scene.nt,
            "step past the end of the run ({} of {})",
            self.n,
            self.scene.nt
        );
        let sample_start = Instant::now();
        let scene = &self.scene;
        let nt = scene.nt as usize;
        let n = self.n as usize;

        // 1: snapshot ABC nodes from the buffer about to be overwritten
        abc::snapshot(&mut self.u2ba, &self.u0, &scene.bna_ixyz);

        // 2: mirror the halo on the previous step
        halo::mirror_halo(&mut self.u1, &self.dims, self.scheme);

        // 3: interior air update
        air::step_air(
            &mut self.u0,
            &self.u1,
            &scene.bn_mask,
            &self.dims,
            self.scheme,
            scene.a1,
            scene.a2,
        );

        // 4: absorbing correction on the fresh values
        abc::apply(&mut self.u0, &self.u2ba, &scene.bna_ixyz, &scene.q_bna, scene.l);
        let air_secs = sample_start.elapsed().as_secs_f64();

        // 5: rigid boundary nodes
        rigid::step_rigid(
            &mut self.u0,
            &self.u1,
            &scene.bn_ixyz,
            &scene.adj_bn,
            &self.dims,
            self.scheme,
            scene.sl2,
            scene.a2,
            &mut self.bn_scratch,
        );

        // 6: gather lossy nodes, integrate, scatter back
        for (nb, &ii) in scene.bnl_ixyz.iter().enumerate() {
            self.u0b[nb] = self.u0[ii as usize];
        }
        let bn_start = Instant::now();
        lossy::step_lossy(
            &mut self.u0b,
            &self.u2b,
            &scene.ssaf_bnl,
            &scene.mat_bnl,
            &scene.mb,
            scene.lo2,
            &mut self.vh1,
            &mut self.gh1,
            &scene.mat_quads,
            &scene.mat_beta,
        );
        let boundary_secs = bn_start.elapsed().as_secs_f64();
        for (nb, &ii) in scene.bnl_ixyz.iter().enumerate() {
            self.u0[ii as usize] = self.u0b[nb];
        }

        // 7: record receivers from the previous-step buffer
        for (nr, &ii) in scene.out_ixyz.iter().enumerate() {
            let sample = self.u1[ii as usize] as f64;
            if !sample.is_finite() {
                self.stats.nonfinite_samples += 1;
            }
            self.u_out[nr * nt + n] = sample;
        }

        // 8: inject sources into the fresh buffer, narrowed
        for (ns, &ii) in scene.in_ixyz.iter().enumerate() {
            self.u0[ii as usize] += scene.in_sigs[ns * nt + n] as Real;
        }

        // 9: rotate buffers; u1 now holds the newest field
        std::mem::swap(&mut self.u0, &mut self.u1);
        std::mem::swap(&mut self.u2b, &mut self.u1b);
        std::mem::swap(&mut self.u1b, &mut self.u0b);

        self.n += 1;
        let sample_secs = sample_start.elapsed().as_secs_f64();
        self.stats.total_secs += sample_secs;
        self.stats.air_secs += air_secs;
        self.stats.boundary_secs += boundary_secs;

        SampleTiming {
            n: self.n - 1,
            nt: self.scene.nt,
            sample_secs,
            air_secs,
            boundary_secs,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            workers: rayon::current_num_threads(),
        }
    }

    /// Run all samples and return the receiver series.
    pub fn run(self) -> RunOutput {
        self.run_with_progress(|_| {})
    }

    /// Run all samples, invoking `progress` after each one.
    pub fn run_with_progress<F: FnMut(&SampleTiming)>(mut self, mut progress: F) -> RunOutput {
        for _ in 0..self.scene.nt {
            let timing = self.step();
            progress(&timing);
        }
        RunOutput {
            u_out: self.u_out,
            nr: self.scene.nr,
            nt: self.scene.nt,
            stats: self.stats,
        }
    }
}
