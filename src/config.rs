//! Configuration of the preparation pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::annotation::LabelMap;
use crate::resolution::Resolution;

/// Everything a preparation run needs to know.
///
/// [`PipelineConfig::default`] reproduces the reference setup: 100 labelled
/// frames per video, a 90/10 split seeded with 5, and a 416x416 training
/// input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding one subdirectory of frame images per video.
    pub dataset_dir: PathBuf,
    /// Path of the metadata JSON file.
    pub metadata_path: PathBuf,
    /// Directory the prepared collections are written to.
    pub output_dir: PathBuf,
    /// Input resolution the detection network is trained for.
    pub target_size: Resolution,
    /// Probability of a sample landing in the training collection.
    pub split_fraction: f64,
    /// Seed of the split draw.
    pub split_seed: u64,
    /// Iteration count handed to the external training step.
    pub train_iterations: u32,
    /// Number of labelled frames to use from every video.
    pub frames_per_video: usize,
    /// Whether to render ground truth overlays next to the images.
    pub render_overlays: bool,
    /// Mapping from raw annotation categories to training labels.
    pub labels: LabelMap,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_dir: "_LABELLED_SAMPLES".into(),
            metadata_path: "metadata.json".into(),
            output_dir: "dataset".into(),
            target_size: Resolution::RES_416,
            split_fraction: 0.9,
            split_seed: 5,
            train_iterations: 15000,
            frames_per_video: 100,
            render_overlays: true,
            labels: LabelMap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.split_fraction, 0.9);
        assert_eq!(config.split_seed, 5);
        assert_eq!(config.frames_per_video, 100);
        assert_eq!(config.train_iterations, 15000);
        assert_eq!(config.target_size, Resolution::new(416, 416));
    }
}
