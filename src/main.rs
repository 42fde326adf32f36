//! Gaze smoothing over a recorded session of eye crops and head poses.

use anyhow::{Context, Result};
use clap::Parser;
use gaze_smoothing::{
    config::Config,
    pipeline::GazePipeline,
    replay::{RecordingPublisher, ReplaySession},
    runner::{run_source, ShutdownSignal},
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded session to replay (YAML format)
    #[arg(short, long, required_unless_present = "print_config")]
    replay: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Directory to write composite gaze images to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Override the maximum head pose age, seconds
    #[arg(long)]
    max_staleness: Option<f64>,

    /// Print the example configuration and exit
    #[arg(long, default_value = "false")]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{}", gaze_smoothing::config::EXAMPLE_CONFIG);
        return Ok(());
    }

    let Some(replay_path) = args.replay else {
        anyhow::bail!("no session to replay");
    };
    info!("Gaze Smoothing - replay of {}", replay_path.display());

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    if let Some(secs) = args.max_staleness {
        config.gate.max_staleness_secs = secs;
    }
    config.validate().context("invalid configuration")?;
    info!("Head poses expected in frame {}", config.frames.camera_frame);

    let session = ReplaySession::from_file(&replay_path)
        .with_context(|| format!("failed to load session {}", replay_path.display()))?;
    let (mut source, lookup, estimator) = session.into_parts();
    info!("Replaying {} frames", source.remaining());

    let mut pipeline = GazePipeline::with_options(
        config.gate()?,
        config.weight_scheme()?,
        lookup,
        estimator,
        RecordingPublisher::new(config.frames.clone()),
        config.pipeline_options()?,
    );

    let processed = run_source(&mut source, &mut pipeline, &ShutdownSignal::new());

    let publisher = pipeline.publisher();
    for transform in publisher.transforms() {
        println!("{transform}");
    }

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        for (index, (timestamp, image)) in publisher.composites().iter().enumerate() {
            let path = dir.join(format!("gaze_{index:05}_{}.png", timestamp.as_nanos()));
            image
                .save(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        info!("Wrote {} composite images to {}", publisher.composites().len(), dir.display());
    }

    info!(
        "Processed {} frames, {} subjects, {} smoothed estimates",
        processed,
        pipeline.registry().len(),
        publisher.transforms().len()
    );

    Ok(())
}
