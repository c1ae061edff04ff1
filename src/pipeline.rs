//! End-to-end dataset preparation.

use std::fs;

use crate::config::PipelineConfig;
use crate::dataset::{self, Manifest};
use crate::error::Result;
use crate::index::AnnotationIndex;
use crate::metadata::Metadata;
use crate::timer::Timer;

/// Counts reported by a completed preparation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Frame images found on disk.
    pub discovered: usize,
    /// Images that had annotations and were kept.
    pub matched: usize,
    /// Samples in the training collection.
    pub train: usize,
    /// Samples in the evaluation collection.
    pub test: usize,
}

/// Runs the full preparation pipeline described by `config`.
///
/// Stages run strictly in order: load metadata, build the index, discover
/// and assemble the samples, split, persist. Persistence only starts once
/// the split has completed, so a failure in any earlier stage leaves the
/// output directory untouched.
pub fn run(config: &PipelineConfig) -> Result<Summary> {
    let mut t_metadata = Timer::new("metadata");
    let mut t_assemble = Timer::new("assemble");
    let mut t_save = Timer::new("save");

    let metadata = t_metadata.time(|| Metadata::load(&config.metadata_path))?;
    let index = AnnotationIndex::build(&metadata.video, config.frames_per_video, &config.labels)?;

    let paths = dataset::discover_images(&config.dataset_dir)?;
    let discovered = paths.len();
    let full = t_assemble.time(|| dataset::assemble(&paths, &index, config.render_overlays))?;
    let matched = full.len();

    let (train, test) = full.split(config.split_fraction, config.split_seed);
    let summary = Summary {
        discovered,
        matched,
        train: train.len(),
        test: test.len(),
    };

    t_save.time(|| -> Result<()> {
        fs::create_dir_all(&config.output_dir)?;
        train.save(&config.output_dir, dataset::TRAIN)?;
        test.save(&config.output_dir, dataset::TEST)?;
        Manifest::new(config).save(&config.output_dir)
    })?;

    log::info!("{t_metadata}, {t_assemble}, {t_save}");
    Ok(summary)
}
