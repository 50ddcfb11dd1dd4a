//! Command-line runner for the 3-D room-acoustics FDTD engine.
//!
//! Usage: roomsim --sim_dir <path> [--engine native] [--out sim_outs.json]
//!
//! The simulation directory must contain a scene file (see
//! [`scene_io::SCENE_FILE`]); the receiver series and timings are
//! written back into the same directory. Worker count follows the
//! RAYON_NUM_THREADS environment variable.

mod scene_io;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use fdtd3d::{Engine3D, SampleTiming};
use thiserror::Error;

#[derive(Debug, Error)]
enum ConfigError {
    #[error("invalid engine '{0}'")]
    InvalidEngine(String),

    #[error("missing simulation directory '{0}'")]
    MissingSimDir(String),

    #[error("missing value for '{0}'")]
    MissingValue(String),

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
}

struct Args {
    engine: String,
    sim_dir: PathBuf,
    out: String,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, ConfigError> {
    let mut engine = String::from("native");
    let mut sim_dir = None;
    let mut out = String::from("sim_outs.json");

    while let Some(arg) = argv.next() {
        let mut value = |name: &str| {
            argv.next().ok_or_else(|| ConfigError::MissingValue(name.to_string()))
        };
        match arg.as_str() {
            "-e" | "--engine" => engine = value("--engine")?,
            "-s" | "--sim_dir" => sim_dir = Some(PathBuf::from(value("--sim_dir")?)),
            "-o" | "--out" => out = value("--out")?,
            other => return Err(ConfigError::UnknownArgument(other.to_string())),
        }
    }

    let sim_dir = sim_dir.ok_or_else(|| ConfigError::MissingValue("--sim_dir".into()))?;
    if !sim_dir.is_dir() {
        return Err(ConfigError::MissingSimDir(sim_dir.display().to_string()));
    }
    Ok(Args { engine, sim_dir, out })
}

fn print_progress(t: &SampleTiming) {
    let done = t.n + 1;
    print!(
        "\rsample {:>6}/{} t={:>8.2}s sample={:>6.2}ms air={:>6.2}ms bn={:>6.2}ms workers={}",
        done,
        t.nt,
        t.elapsed_secs,
        t.sample_secs * 1e3,
        t.air_secs * 1e3,
        t.boundary_secs * 1e3,
        t.workers,
    );
    let _ = std::io::stdout().flush();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args(std::env::args().skip(1))?;

    match args.engine.as_str() {
        "native" => println!("engine: native"),
        other => return Err(ConfigError::InvalidEngine(other.to_string()).into()),
    }

    let scene = scene_io::load_scene(&args.sim_dir.join(scene_io::SCENE_FILE))?;
    let npts = scene.npts();
    let nt = scene.nt;
    println!(
        "grid {}x{}x{} ({} cells), {} samples, scheme flag {}",
        scene.nx, scene.ny, scene.nz, npts, nt, scene.fcc_flag
    );
    println!(
        "boundary nodes: {} rigid, {} lossy, {} abc",
        scene.nb, scene.nbl, scene.nba
    );

    let engine = Engine3D::new(scene)?;
    let output = engine.run_with_progress(print_progress);
    println!();

    let stats = &output.stats;
    println!(
        "air update: {:.6}s, combined: {:.6}s, {:.2} Mvox/s",
        stats.air_secs,
        stats.total_secs,
        stats.voxel_rate(npts, nt) / 1e6
    );
    if stats.nonfinite_samples > 0 {
        eprintln!(
            "warning: {} non-finite receiver samples",
            stats.nonfinite_samples
        );
    }

    let out_path = args.sim_dir.join(&args.out);
    scene_io::write_output(&out_path, &output)?;
    println!("wrote {}", out_path.display());
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
