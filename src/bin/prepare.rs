//! Turns a collection of labeled videos into a hand detection training dataset.

use std::path::PathBuf;

use clap::Parser;
use egohands::annotation::LabelMap;
use egohands::config::PipelineConfig;
use egohands::pipeline;
use egohands::resolution::Resolution;

/// Prepares a hand detection training dataset from labeled videos.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Directory holding one subdirectory of frame images per video.
    #[arg(long, default_value = "_LABELLED_SAMPLES")]
    dataset_dir: PathBuf,

    /// Path of the metadata JSON file.
    #[arg(long, default_value = "metadata.json")]
    metadata: PathBuf,

    /// Directory the prepared collections are written to.
    #[arg(long, default_value = "dataset")]
    out: PathBuf,

    /// Side length of the square network input the dataset is prepared for.
    #[arg(long, default_value_t = 416)]
    target_size: u32,

    /// Probability of a sample landing in the training collection.
    #[arg(long, default_value_t = 0.9)]
    split_fraction: f64,

    /// Seed of the split draw.
    #[arg(long, default_value_t = 5)]
    split_seed: u64,

    /// Iteration count recorded for the external training step.
    #[arg(long, default_value_t = 15000)]
    train_iterations: u32,

    /// Number of labelled frames to expect from every video.
    #[arg(long, default_value_t = 100)]
    frames_per_video: usize,

    /// Skip rendering ground truth overlays.
    #[arg(long)]
    no_overlays: bool,
}

fn main() -> anyhow::Result<()> {
    egohands::init_logger!();

    let args = Args::parse();
    let config = PipelineConfig {
        dataset_dir: args.dataset_dir,
        metadata_path: args.metadata,
        output_dir: args.out,
        target_size: Resolution::new(args.target_size, args.target_size),
        split_fraction: args.split_fraction,
        split_seed: args.split_seed,
        train_iterations: args.train_iterations,
        frames_per_video: args.frames_per_video,
        render_overlays: !args.no_overlays,
        labels: LabelMap::default(),
    };

    let summary = pipeline::run(&config)?;
    log::info!(
        "prepared {} of {} discovered frames ({} train / {} test)",
        summary.matched,
        summary.discovered,
        summary.train,
        summary.test,
    );
    Ok(())
}
