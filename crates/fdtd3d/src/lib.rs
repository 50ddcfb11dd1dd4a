//! 3D room-acoustics FDTD engine.
//!
//! Advances the acoustic wave equation on a regular volumetric grid over
//! discrete time and records a pressure time series at each receiver.
//! Three lattice schemes are supported: a 7-point Cartesian stencil and two
//! 13-point face-centred-cubic variants (checkerboard and folded).
//!
//! Boundaries come in three flavours that compose per scene:
//! - rigid walls, either by halo mirroring at the outer faces or by
//!   adjacency-masked boundary nodes for interior geometry,
//! - a first-order absorbing termination at designated outer nodes,
//! - frequency-dependent lossy surfaces modelled as per-material RLC
//!   branches with auxiliary state integrated alongside the field.
//!
//! # Example
//!
//! ```
//! use fdtd3d::rooms::{gaussian_pulse, ShoeboxRoom};
//! use fdtd3d::Engine3D;
//!
//! let mut room = ShoeboxRoom::new(12, 12, 12, 48);
//! room.add_source(6, 6, 6, gaussian_pulse(48, 8, 2.0));
//! room.add_receiver(8, 6, 6);
//!
//! let engine = Engine3D::new(room.build()).unwrap();
//! let output = engine.run();
//! assert_eq!(output.receiver(0).len(), 48);
//! ```

pub mod abc;
pub mod air;
pub mod engine;
pub mod grid;
pub mod halo;
pub mod lossy;
pub mod rigid;
pub mod rooms;
pub mod scene;

pub use engine::{Engine3D, RunOutput, RunStats, SampleTiming};
pub use grid::{GridDims, Scheme};
pub use lossy::{MatQuad, MAX_MATERIALS, MMB};
pub use rooms::{ShoeboxRoom, WallTreatment};
pub use scene::{ContractViolation, Scene};

/// Working precision of the pressure field and stencil coefficients.
///
/// Source signals and receiver outputs are always `f64`; samples are
/// promoted at readout and narrowed at injection.
#[cfg(not(feature = "f64"))]
pub type Real = f32;

/// Working precision of the pressure field and stencil coefficients.
#[cfg(feature = "f64")]
pub type Real = f64;
