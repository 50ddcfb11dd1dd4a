//! FCC lattice behaviour: checkerboard parity, folded halo, stability.

use fdtd3d::rooms::{gaussian_pulse, ShoeboxRoom};
use fdtd3d::{Engine3D, Real, Scheme};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn test_checkerboard_inactive_cells_stay_zero() {
    let mut room = ShoeboxRoom::new(14, 14, 14, 40);
    room.scheme = Scheme::FccCheckerboard;
    room.l = 0.9;
    // source on an active-parity cell
    room.add_source(7, 7, 6, gaussian_pulse(40, 6, 2.0));
    room.add_receiver(7, 7, 8);
    let scene = room.build();
    let dims = scene.dims();

    let mut engine = Engine3D::new(scene).unwrap();
    for _ in 0..40 {
        engine.step();
    }

    for ix in 2..12 {
        for iy in 2..12 {
            for iz in 2..12 {
                if (ix + iy + iz) % 2 == 1 {
                    let ii = dims.idx(ix, iy, iz);
                    assert_eq!(
                        engine.u1[ii], 0.0,
                        "inactive cell {:?} was written",
                        (ix, iy, iz)
                    );
                }
            }
        }
    }
}

#[test]
fn test_checkerboard_pulse_reaches_receiver() {
    let nt = 60;
    let mut room = ShoeboxRoom::new(14, 14, 14, nt);
    room.scheme = Scheme::FccCheckerboard;
    room.l = 0.9;
    room.add_source(7, 7, 6, gaussian_pulse(nt, 6, 2.0));
    room.add_receiver(7, 7, 8);
    let output = Engine3D::new(room.build()).unwrap().run();

    let peak = output
        .receiver(0)
        .iter()
        .map(|v| v.abs())
        .fold(0.0, f64::max);
    assert!(peak.is_finite());
    assert!(peak > 1e-4, "pulse never reached the receiver");
}

#[test]
fn test_folded_pulse_reaches_receiver() {
    let nt = 60;
    let mut room = ShoeboxRoom::new(14, 14, 14, nt);
    room.scheme = Scheme::FccFolded;
    room.l = 0.9;
    room.add_source(7, 7, 7, gaussian_pulse(nt, 6, 2.0));
    room.add_receiver(10, 9, 7);
    let output = Engine3D::new(room.build()).unwrap().run();

    let series = output.receiver(0);
    assert!(series.iter().all(|v| v.is_finite()));
    let peak = series.iter().map(|v| v.abs()).fold(0.0, f64::max);
    assert!(peak > 1e-4, "pulse never reached the receiver");
}

#[test]
fn test_folded_closed_box_energy_bounded() {
    let mut room = ShoeboxRoom::new(12, 12, 12, 250);
    room.scheme = Scheme::FccFolded;
    room.l = 0.9;
    let mut engine = Engine3D::new(room.build()).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for v in engine.u0.iter_mut().chain(engine.u1.iter_mut()) {
        *v = rng.gen_range(-1.0..1.0) as Real;
    }

    for _ in 0..250 {
        engine.step();
    }

    let peak = engine
        .u1
        .iter()
        .map(|&v| (v as f64).abs())
        .fold(0.0, f64::max);
    assert!(peak.is_finite());
    assert!(peak < 50.0, "folded field grew to {}", peak);
}

#[test]
fn test_checkerboard_closed_box_energy_bounded() {
    let mut room = ShoeboxRoom::new(12, 12, 12, 250);
    room.scheme = Scheme::FccCheckerboard;
    room.l = 0.9;
    let scene = room.build();
    let dims = scene.dims();
    let mut engine = Engine3D::new(scene).unwrap();

    // random field on the active sublattice only
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for ix in 1..11 {
        for iy in 1..11 {
            for iz in 1..11 {
                if (ix + iy + iz) % 2 == 0 {
                    let ii = dims.idx(ix, iy, iz);
                    engine.u0[ii] = rng.gen_range(-1.0..1.0) as Real;
                    engine.u1[ii] = rng.gen_range(-1.0..1.0) as Real;
                }
            }
        }
    }

    for _ in 0..250 {
        engine.step();
    }

    let peak = engine
        .u1
        .iter()
        .map(|&v| (v as f64).abs())
        .fold(0.0, f64::max);
    assert!(peak.is_finite());
    assert!(peak < 50.0, "checkerboard field grew to {}", peak);
}
