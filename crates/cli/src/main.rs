#![deny(unsafe_code)]
//! CLI binary for the wind-tunnel flow engine.
//!
//! Subcommands:
//! - `run`: step a simulation headlessly and report or save the final snapshot
//! - `schema`: print the parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use wind_tunnel_core::{RunSpec, Snapshot};
use wind_tunnel_sim::obstacle::obstacles_from_json;
use wind_tunnel_sim::{Simulation, SimulationParamsPatch, VisualizationParamsPatch};

/// Frames run when neither a flag nor a run file says otherwise.
const DEFAULT_FRAMES: usize = 600;
const DEFAULT_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "wind-tunnel", about = "Wind tunnel particle flow engine CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log subsystem rebuilds and lifecycle events (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Step the simulation for N frames and summarize the final state.
    Run {
        /// Run file (JSON) with params, visualization, obstacles, seed, frames, dt.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames; overrides the run file.
        #[arg(short, long)]
        frames: Option<usize>,

        /// Seconds per frame; overrides the run file.
        #[arg(long)]
        dt: Option<f64>,

        /// Master PRNG seed; overrides the run file.
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation parameter overrides as a JSON object.
        #[arg(long)]
        params: Option<String>,

        /// Visualization overrides as a JSON object.
        #[arg(long)]
        visualization: Option<String>,

        /// Obstacles as a JSON array.
        #[arg(long)]
        obstacles: Option<String>,

        /// Write the final snapshot as JSON to this path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the resolved run file to this path for replay.
        #[arg(long)]
        save_run: Option<PathBuf>,
    },
    /// Print the parameter schema as JSON.
    Schema,
}

/// Command-line overrides layered on top of a run file.
#[derive(Default)]
struct RunOverrides {
    frames: Option<usize>,
    dt: Option<f64>,
    seed: Option<u64>,
    params: Option<String>,
    visualization: Option<String>,
    obstacles: Option<String>,
}

fn parse_json_flag(flag: &str, text: &str) -> Result<Value, CliError> {
    serde_json::from_str(text).map_err(|e| CliError::Input(format!("invalid --{flag} JSON: {e}")))
}

fn load_run_spec(path: &Path) -> Result<RunSpec, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    RunSpec::from_json_str(&text).map_err(|e| CliError::Input(format!("{}: {e}", path.display())))
}

/// Resolves the run file (or defaults) and applies command-line overrides.
fn resolve_run_spec(config: Option<&Path>, overrides: RunOverrides) -> Result<RunSpec, CliError> {
    let mut spec = match config {
        Some(path) => load_run_spec(path)?,
        None => RunSpec {
            frames: DEFAULT_FRAMES,
            ..RunSpec::new(DEFAULT_SEED)
        },
    };
    if let Some(frames) = overrides.frames {
        spec.frames = frames;
    }
    if let Some(dt) = overrides.dt {
        spec.dt = dt;
    }
    if let Some(seed) = overrides.seed {
        spec.seed = seed;
    }
    if let Some(text) = overrides.params {
        spec.params = parse_json_flag("params", &text)?;
    }
    if let Some(text) = overrides.visualization {
        spec.visualization = parse_json_flag("visualization", &text)?;
    }
    if let Some(text) = overrides.obstacles {
        spec.obstacles = match parse_json_flag("obstacles", &text)? {
            Value::Array(items) => items,
            _ => return Err(CliError::Input("--obstacles must be a JSON array".into())),
        };
    }
    spec.validate().map_err(|e| CliError::Input(e.to_string()))?;
    Ok(spec)
}

/// Builds a simulation from a resolved run file, rejecting mistyped parameters.
fn build_simulation(spec: &RunSpec) -> Result<Simulation, CliError> {
    SimulationParamsPatch::from_json(&spec.params)?;
    VisualizationParamsPatch::from_json(&spec.visualization)?;
    let obstacles = obstacles_from_json(&spec.obstacles)?;

    let mut sim = Simulation::from_json(&spec.params, &spec.visualization, spec.seed);
    sim.set_obstacles(obstacles);
    Ok(sim)
}

fn summary(spec: &RunSpec, snapshot: &Snapshot, sim: &Simulation) -> Value {
    let respawns: u64 = sim
        .particles()
        .respawn_counts()
        .iter()
        .map(|&c| u64::from(c))
        .sum();
    json!({
        "seed": spec.seed,
        "frames": snapshot.frame,
        "sim_time": snapshot.sim_time,
        "particle_count": snapshot.particle_count,
        "mean_speed": snapshot.mean_speed(),
        "max_heat": snapshot.max_heat(),
        "respawns": respawns,
        "vortices": sim.vortices().vortices().len(),
    })
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string(value)?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Io(format!("cannot write {}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&Simulation::schema())?);
        }
        Command::Run {
            config,
            frames,
            dt,
            seed,
            params,
            visualization,
            obstacles,
            output,
            save_run,
        } => {
            let overrides = RunOverrides {
                frames,
                dt,
                seed,
                params,
                visualization,
                obstacles,
            };
            let spec = resolve_run_spec(config.as_deref(), overrides)?;
            if let Some(path) = &save_run {
                write_json(path, &spec)?;
            }

            let mut sim = build_simulation(&spec)?;
            tracing::info!(seed = spec.seed, frames = spec.frames, dt = spec.dt, "starting run");
            for _ in 0..spec.frames {
                sim.update(spec.dt);
            }
            let snapshot = sim.snapshot();

            if let Some(path) = &output {
                write_json(path, snapshot)?;
            }

            let info = summary(&spec, snapshot, &sim);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "ran {} frames (seed {}, {} particles): t = {:.3}s, mean speed {:.3}, max heat {:.3}, {} respawns",
                    snapshot.frame,
                    spec.seed,
                    snapshot.particle_count,
                    snapshot.sim_time,
                    snapshot.mean_speed(),
                    snapshot.max_heat(),
                    info["respawns"],
                );
                if let Some(path) = &output {
                    eprintln!("snapshot -> {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn overrides() -> RunOverrides {
        RunOverrides::default()
    }

    #[test]
    fn defaults_without_config() {
        let spec = resolve_run_spec(None, overrides()).unwrap();
        assert_eq!(spec.seed, DEFAULT_SEED);
        assert_eq!(spec.frames, DEFAULT_FRAMES);
    }

    #[test]
    fn flags_override_run_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 7, "frames": 10, "params": {{"wind_speed": 2}}}}"#).unwrap();
        let spec = resolve_run_spec(
            Some(file.path()),
            RunOverrides {
                frames: Some(3),
                params: Some(r#"{"wind_speed": 5}"#.into()),
                ..overrides()
            },
        )
        .unwrap();
        assert_eq!(spec.seed, 7);
        assert_eq!(spec.frames, 3);
        assert_eq!(spec.params["wind_speed"], 5);
    }

    #[test]
    fn missing_run_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = resolve_run_spec(Some(missing.as_path()), overrides())
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn malformed_flags_are_input_errors() {
        let bad_json = RunOverrides {
            params: Some("{oops".into()),
            ..overrides()
        };
        assert_eq!(resolve_run_spec(None, bad_json).err().unwrap().exit_code(), 12);

        let not_array = RunOverrides {
            obstacles: Some("{}".into()),
            ..overrides()
        };
        assert_eq!(resolve_run_spec(None, not_array).err().unwrap().exit_code(), 12);

        let bad_dt = RunOverrides {
            dt: Some(-1.0),
            ..overrides()
        };
        assert_eq!(resolve_run_spec(None, bad_dt).err().unwrap().exit_code(), 12);
    }

    #[test]
    fn mistyped_param_is_engine_error() {
        let spec = RunSpec {
            params: json!({"wind_speed": "fast"}),
            ..RunSpec::new(1)
        };
        let err = build_simulation(&spec).err().unwrap();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn bad_obstacle_is_engine_error() {
        let spec = RunSpec {
            obstacles: vec![json!({"shape": "torus"})],
            ..RunSpec::new(1)
        };
        assert_eq!(build_simulation(&spec).err().unwrap().exit_code(), 10);
    }

    #[test]
    fn run_writes_snapshot_and_replayable_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let snap_path = dir.path().join("snap.json");
        let run_path = dir.path().join("run.json");
        let cli = Cli {
            json: true,
            verbose: false,
            command: Command::Run {
                config: None,
                frames: Some(5),
                dt: None,
                seed: Some(9),
                params: Some(r#"{"particle_count": 25}"#.into()),
                visualization: Some(r#"{"trail_length": 3}"#.into()),
                obstacles: Some(r#"[{"shape": "sphere", "position": [0, 0, 0], "radius": 1}]"#.into()),
                output: Some(snap_path.clone()),
                save_run: Some(run_path.clone()),
            },
        };
        run(cli).unwrap();

        let snap: Snapshot =
            serde_json::from_str(&std::fs::read_to_string(&snap_path).unwrap()).unwrap();
        assert_eq!(snap.particle_count, 25);
        assert_eq!(snap.positions.len(), 75);
        assert_eq!(snap.trail_len, 3);
        assert_eq!(snap.frame, 5);

        let replay = load_run_spec(&run_path).unwrap();
        assert_eq!(replay.seed, 9);
        assert_eq!(replay.frames, 5);
        let mut sim = build_simulation(&replay).unwrap();
        for _ in 0..replay.frames {
            sim.update(replay.dt);
        }
        assert_eq!(sim.snapshot().positions, snap.positions);
        assert_eq!(sim.snapshot().heat, snap.heat);
    }

    #[test]
    fn schema_lists_simulation_and_visualization_keys() {
        let schema = Simulation::schema();
        assert!(schema["wind_speed"].is_object());
        assert!(schema["visualization"]["properties"]["show_trails"].is_object());
    }
}
