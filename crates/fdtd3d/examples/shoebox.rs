//! Minimal end-to-end run: a Gaussian pulse in a rigid shoebox.
//!
//! Run with: cargo run --example shoebox

use fdtd3d::rooms::{gaussian_pulse, ShoeboxRoom};
use fdtd3d::{Engine3D, WallTreatment};

fn main() {
    let nt = 240;
    let mut room = ShoeboxRoom::new(32, 28, 24, nt);
    room.walls = WallTreatment::Rigid;
    room.add_source(16, 14, 12, gaussian_pulse(nt, 12, 4.0));
    room.add_receiver(22, 14, 12);
    room.add_receiver(8, 20, 12);

    let scene = room.build();
    let npts = scene.npts();
    let engine = Engine3D::new(scene).expect("scene is valid by construction");
    let output = engine.run();

    for nr in 0..output.nr as usize {
        let series = output.receiver(nr);
        let (peak_n, peak) = series
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (n, v)| if v > best.1 { (n, v) } else { best });
        println!("receiver {}: peak {:.4e} at sample {}", nr, peak, peak_n);
    }
    println!(
        "{} samples over {} cells in {:.3}s ({:.2} Mvox/s)",
        output.nt,
        npts,
        output.stats.total_secs,
        output.stats.voxel_rate(npts, output.nt) / 1e6
    );
}
