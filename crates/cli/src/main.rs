#![deny(unsafe_code)]
//! Headless host for the flowfield visualizer.
//!
//! Subcommands:
//! - `run` — tick the simulation, optionally recording a looping GIF
//! - `snapshot` — tick N times and write the final frame as PNG
//! - `config` — print the effective configuration as JSON

mod error;
mod host;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use flowfield_core::{FlowConfig, Simulation};
use flowfield_recorder::{FrameRecorder, RecorderSettings};
use host::{RunSummary, ScriptedInput};
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "flowfield", about = "Noise-driven particle flow field")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON config file (any subset of fields; the rest use defaults).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parameter overrides as a JSON object, applied after --config.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Fixed seed; without it the run is seeded from the clock.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation headless, optionally recording a GIF.
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Stop after this many ticks (default: until the recording is done,
        /// or 600 without a recording).
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Frames to record; overrides `record_frames` from the config.
        #[arg(short, long)]
        record: Option<usize>,

        /// GIF output path.
        #[arg(short, long, default_value = "output.gif")]
        output: PathBuf,

        /// Reset the field at these ticks (repeatable).
        #[arg(long = "reset-at")]
        reset_at: Vec<u64>,
    },
    /// Run N ticks and write the last frame as PNG.
    Snapshot {
        #[command(flatten)]
        config: ConfigArgs,

        /// Number of ticks before the snapshot.
        #[arg(short, long, default_value_t = 300)]
        ticks: u64,

        /// PNG output path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Print the effective configuration.
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

const DEFAULT_TICKS: u64 = 600;

fn load_config(args: &ConfigArgs) -> Result<FlowConfig, CliError> {
    let base = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::Input(format!("cannot read {}: {e}", path.display())))?;
            serde_json::from_str::<FlowConfig>(&text)
                .map_err(|e| CliError::Input(format!("invalid config {}: {e}", path.display())))?
        }
        None => FlowConfig::default(),
    };
    let params: serde_json::Value = serde_json::from_str(&args.params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let mut config = base.with_overrides(&params)?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn create_output(path: &Path) -> Result<BufWriter<File>, CliError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| CliError::Io(format!("cannot create {}: {e}", path.display())))
}

/// Removes `path` unless `result` carries a finished animation, so an
/// abandoned or failed recording leaves no empty or truncated file behind.
fn discard_unfinished_output(
    path: &Path,
    result: Result<RunSummary, CliError>,
) -> Result<RunSummary, CliError> {
    let finished = matches!(&result, Ok(summary) if summary.recorded_frames.is_some());
    if !finished {
        match std::fs::remove_file(path) {
            Ok(()) => info!("removed unfinished {}", path.display()),
            Err(e) => warn!("cannot remove unfinished {}: {e}", path.display()),
        }
    }
    result
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config { config } => {
            let config = load_config(&config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Run {
            config,
            ticks,
            record,
            output,
            reset_at,
        } => {
            let mut config = load_config(&config)?;
            if let Some(frames) = record {
                config.record_frames = frames;
            }
            let mut sim = Simulation::new(config.clone())?;
            let mut frame = sim.new_frame_buffer()?;

            let recording = if config.record_frames > 0 {
                let sink = create_output(&output)?;
                let (recorder, handle) =
                    FrameRecorder::start(sink, RecorderSettings::from_config(&config))?;
                sim.attach_sink(Box::new(recorder));
                Some((handle, config.record_frames))
            } else {
                None
            };
            let quit_at = match (ticks, &recording) {
                (Some(limit), _) => Some(limit),
                (None, Some(_)) => None,
                (None, None) => Some(DEFAULT_TICKS),
            };
            let mut input = ScriptedInput::new(reset_at, quit_at);

            let recording_requested = recording.is_some();
            let result = host::run(&mut sim, &mut frame, &mut input, recording);
            let summary = if recording_requested {
                discard_unfinished_output(&output, result)?
            } else {
                result?
            };

            if cli.json {
                let info = serde_json::json!({
                    "ticks": summary.ticks,
                    "seed": sim.seed(),
                    "recorded_frames": summary.recorded_frames,
                    "output": summary.recorded_frames.map(|_| output.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let Some(frames) = summary.recorded_frames {
                eprintln!(
                    "recorded {frames} frames over {} ticks (seed {}) -> {}",
                    summary.ticks,
                    sim.seed(),
                    output.display()
                );
            } else {
                eprintln!("ran {} ticks (seed {})", summary.ticks, sim.seed());
            }
        }
        Command::Snapshot {
            config,
            ticks,
            output,
        } => {
            let config = load_config(&config)?;
            let mut sim = Simulation::new(config)?;
            let mut frame = sim.new_frame_buffer()?;
            let mut input = ScriptedInput::new(Vec::new(), Some(ticks));
            host::run::<_, BufWriter<File>>(&mut sim, &mut frame, &mut input, None)?;
            flowfield_recorder::snapshot::write_png(&frame, &output)?;
            info!("snapshot after {ticks} ticks written to {}", output.display());

            if cli.json {
                let info = serde_json::json!({
                    "ticks": ticks,
                    "seed": sim.seed(),
                    "width": frame.width(),
                    "height": frame.height(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {}x{} after {ticks} ticks (seed {}) -> {}",
                    frame.width(),
                    frame.height(),
                    sim.seed(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
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
    use flowfield_recorder::RecordError;

    fn args(params: &str) -> ConfigArgs {
        ConfigArgs {
            config: None,
            params: params.into(),
            seed: None,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn load_config_applies_params_and_seed() {
        let mut a = args(r#"{"particles": 10, "workers": 2}"#);
        a.seed = Some(5);
        let config = load_config(&a).unwrap();
        assert_eq!(config.particles, 10);
        assert_eq!(config.workers, 2);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn load_config_rejects_bad_json() {
        let err = load_config(&args("{nope")).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn load_config_reads_file_then_params() {
        let dir = std::env::temp_dir().join(format!("flowfield-cli-{}", process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"width": 100, "height": 60, "particles": 7}"#).unwrap();
        let config = load_config(&ConfigArgs {
            config: Some(path.clone()),
            params: r#"{"particles": 9}"#.into(),
            seed: None,
        })
        .unwrap();
        assert_eq!((config.width, config.height, config.particles), (100, 60, 9));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unfinished_recording_output_is_removed() {
        let dir = std::env::temp_dir().join(format!("flowfield-out-{}", process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.gif");
        let summary = |frames| RunSummary {
            ticks: 3,
            recorded_frames: frames,
        };

        std::fs::write(&path, b"").unwrap();
        assert!(discard_unfinished_output(&path, Ok(summary(None))).is_ok());
        assert!(!path.exists());

        std::fs::write(&path, b"GIF8").unwrap();
        let err = discard_unfinished_output(&path, Err(CliError::Record(RecordError::WorkerPanicked)));
        assert_eq!(err.unwrap_err().exit_code(), 14);
        assert!(!path.exists());

        std::fs::write(&path, b"GIF89a").unwrap();
        let kept = discard_unfinished_output(&path, Ok(summary(Some(3)))).unwrap();
        assert_eq!(kept.recorded_frames, Some(3));
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parses_run_with_repeated_resets() {
        let cli = Cli::try_parse_from([
            "flowfield", "run", "--record", "30", "--reset-at", "5", "--reset-at", "9",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                record, reset_at, ..
            } => {
                assert_eq!(record, Some(30));
                assert_eq!(reset_at, vec![5, 9]);
            }
            _ => panic!("expected run"),
        }
    }
}
