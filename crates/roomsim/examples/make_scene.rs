//! Write a demo scene file the runner can consume.
//!
//! Usage: cargo run --example make_scene [dir]
//!
//! Builds a rigid 32x28x24 shoebox with a Gaussian pulse source and two
//! receivers, then saves it as sim_data.json in the given directory.

use std::fs;
use std::path::PathBuf;

use fdtd3d::rooms::{gaussian_pulse, ShoeboxRoom};
use fdtd3d::WallTreatment;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo_sim".to_string())
        .into();
    fs::create_dir_all(&dir)?;

    let nt = 480;
    let mut room = ShoeboxRoom::new(32, 28, 24, nt);
    room.walls = WallTreatment::Rigid;
    room.add_source(16, 14, 12, gaussian_pulse(nt, 16, 5.0));
    room.add_receiver(22, 14, 12);
    room.add_receiver(8, 20, 12);

    let scene = room.build();
    scene.validate()?;

    let path = dir.join("sim_data.json");
    fs::write(&path, serde_json::to_string(&scene)?)?;
    println!("wrote {}", path.display());
    println!("run with: roomsim --sim_dir {}", dir.display());
    Ok(())
}
