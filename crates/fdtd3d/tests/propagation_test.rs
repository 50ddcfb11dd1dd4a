//! Free-field propagation through the air stencil.
//!
//! A Gaussian pulse in a large room, observed before any wall
//! reflection returns: arrival time follows the Courant number and the
//! peak decays with distance.

use fdtd3d::rooms::{gaussian_pulse, ShoeboxRoom};
use fdtd3d::Engine3D;

const NT: usize = 48;
const PULSE_CENTER: usize = 10;

/// 32-cube, source at the centre, receivers 5 and 10 cells out on +x.
fn free_field_run() -> fdtd3d::RunOutput {
    let mut room = ShoeboxRoom::new(32, 32, 32, NT);
    room.add_source(16, 16, 16, gaussian_pulse(NT, PULSE_CENTER, 4.0));
    room.add_receiver(21, 16, 16);
    room.add_receiver(26, 16, 16);
    Engine3D::new(room.build()).unwrap().run()
}

fn peak(series: &[f64]) -> (usize, f64) {
    series
        .iter()
        .copied()
        .enumerate()
        .take(42) // stop before the first wall reflection
        .fold((0, f64::MIN), |best, (n, v)| if v > best.1 { (n, v) } else { best })
}

#[test]
fn test_pulse_arrival_time() {
    let output = free_field_run();

    // travel time is r / l samples after the pulse peak
    let (n5, _) = peak(output.receiver(0));
    let (n10, _) = peak(output.receiver(1));

    let expect5 = PULSE_CENTER as i64 + 10; // 5 / 0.5
    let expect10 = PULSE_CENTER as i64 + 20;
    assert!((n5 as i64 - expect5).abs() <= 3, "r=5 peak at {}", n5);
    assert!((n10 as i64 - expect10).abs() <= 3, "r=10 peak at {}", n10);
    assert!(n10 > n5, "farther receiver must peak later");
}

#[test]
fn test_peak_decays_roughly_as_inverse_distance() {
    let output = free_field_run();

    let (_, p5) = peak(output.receiver(0));
    let (_, p10) = peak(output.receiver(1));

    assert!(p5 > 0.0 && p10 > 0.0);
    let ratio = p5 / p10;
    assert!(
        (1.4..=2.8).contains(&ratio),
        "expected roughly 1/r decay, got ratio {}",
        ratio
    );
}

#[test]
fn test_no_signal_before_arrival() {
    let output = free_field_run();

    // nothing should reach r=10 before the pulse has had time to cross
    let early: f64 = output.receiver(1)[..PULSE_CENTER]
        .iter()
        .map(|v| v.abs())
        .fold(0.0, f64::max);
    let (_, p10) = peak(output.receiver(1));
    assert!(early < 0.05 * p10, "acausal energy {} vs peak {}", early, p10);
}
