//! Assembly, splitting, and persistence of training datasets.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::annotation::HandAnnotation;
use crate::config::PipelineConfig;
use crate::draw;
use crate::error::{Error, Result};
use crate::index::{AnnotationIndex, FrameKey};
use crate::matching::{self, Match, SideTally};
use crate::resolution::Resolution;

/// Name of the training collection.
pub const TRAIN: &str = "train";
/// Name of the evaluation collection.
pub const TEST: &str = "test";

const ANNOTATIONS_FILE: &str = "annotations.json";
const MANIFEST_FILE: &str = "manifest.json";

/// One frame image together with its ground truth annotations.
pub struct Sample {
    /// Path the image was loaded from.
    pub path: PathBuf,
    pub image: RgbImage,
    pub annotations: Vec<HandAnnotation>,
    /// Copy of the image with the annotations drawn in, present when overlay
    /// rendering is enabled.
    pub overlay: Option<RgbImage>,
}

/// Collects all frame images underneath `dir`.
///
/// The expected layout is one directory per video with the frames directly
/// inside it. Files with other extensions are ignored. The returned paths
/// are sorted, so discovery is deterministic regardless of the order the
/// filesystem yields entries in.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        for file in fs::read_dir(entry.path())? {
            let path = file?.path();
            if is_supported_image(&path) {
                paths.push(path);
            }
        }
    }
    paths.sort();
    log::debug!(
        "discovered {} frame images in {}",
        paths.len(),
        dir.display()
    );
    Ok(paths)
}

fn is_supported_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    matches!(ext.as_deref(), Some("jpg" | "jpeg" | "png"))
}

/// Loads every image that has annotations and pairs the two up.
///
/// Images without an index entry are dropped, counted, and logged, they are
/// not errors. When `render_overlays` is set, each sample also receives a
/// copy of its image with the ground truth drawn in.
pub fn assemble(
    paths: &[PathBuf],
    index: &AnnotationIndex,
    render_overlays: bool,
) -> Result<Dataset> {
    let mut samples = Vec::new();
    let mut unmatched = 0usize;
    for path in paths {
        match matching::match_path(index, path) {
            Match::Unmatched => {
                unmatched += 1;
                log::trace!("no annotations for {}", path.display());
            }
            Match::Matched(annotations) => {
                let image = image::open(path)?.to_rgb8();
                let overlay = render_overlays.then(|| {
                    let mut copy = image.clone();
                    draw::draw_annotations(&mut copy, &annotations);
                    copy
                });
                samples.push(Sample {
                    path: path.clone(),
                    image,
                    annotations,
                    overlay,
                });
            }
        }
    }

    let tally = SideTally::count(samples.iter().map(|s| s.annotations.as_slice()));
    log::info!(
        "assembled {} samples ({unmatched} unannotated images dropped), {tally}",
        samples.len(),
    );
    Ok(Dataset { samples })
}

/// An in-memory dataset of annotated samples.
///
/// At most one fully materialized dataset exists at a time: splitting
/// consumes it and moves the samples into the two halves without copying
/// pixel data.
#[derive(Default)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Splits this dataset into a training and an evaluation half.
    ///
    /// Each sample independently lands in the training half with probability
    /// `fraction`, so every sample ends up in exactly one of the two. The
    /// draw is seeded: the same samples in the same order split the same way
    /// on every run.
    pub fn split(self, fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let total = self.samples.len();
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();
        for sample in self.samples {
            if rng.f64() < fraction {
                train.push(sample);
            } else {
                test.push(sample);
            }
        }
        log::info!(
            "split {total} samples into {} train / {} test",
            train.len(),
            test.len(),
        );
        (Dataset { samples: train }, Dataset { samples: test })
    }

    /// Persists this dataset as the named collection under `dir`.
    ///
    /// The layout is `<dir>/<name>/images/<video>/<frame>` plus a single
    /// `annotations.json` listing every sample. Overlays go to a sibling
    /// `overlays/` tree when present.
    pub fn save(&self, dir: &Path, name: &str) -> Result<()> {
        let root = dir.join(name);
        let images = root.join("images");
        fs::create_dir_all(&images)?;

        let mut rows = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            let key = FrameKey::from_path(&sample.path).ok_or_else(|| {
                Error::Metadata(format!(
                    "cannot derive a frame key from {}",
                    sample.path.display()
                ))
            })?;
            let rel = Path::new(key.as_str());

            if let Some(parent) = rel.parent() {
                fs::create_dir_all(images.join(parent))?;
            }
            sample.image.save(images.join(rel))?;

            if let Some(overlay) = &sample.overlay {
                let overlay_path = root.join("overlays").join(rel);
                if let Some(parent) = overlay_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                overlay.save(overlay_path)?;
            }

            rows.push(Row {
                path: key.as_str().to_owned(),
                annotations: sample.annotations.clone(),
            });
        }

        fs::write(root.join(ANNOTATIONS_FILE), serde_json::to_vec_pretty(&rows)?)?;
        log::info!("saved {} samples to {}", self.samples.len(), root.display());
        Ok(())
    }

    /// Loads a previously saved collection back into memory.
    pub fn load(dir: &Path, name: &str) -> Result<Dataset> {
        let root = dir.join(name);
        let rows: Vec<Row> =
            serde_json::from_str(&fs::read_to_string(root.join(ANNOTATIONS_FILE))?)?;

        let mut samples = Vec::with_capacity(rows.len());
        for row in rows {
            let path = root.join("images").join(&row.path);
            let image = image::open(&path)?.to_rgb8();
            samples.push(Sample {
                path,
                image,
                annotations: row.annotations,
                overlay: None,
            });
        }
        log::debug!("loaded {} samples from {}", samples.len(), root.display());
        Ok(Dataset { samples })
    }
}

/// One entry of `annotations.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Row {
    path: String,
    annotations: Vec<HandAnnotation>,
}

/// Description of a prepared dataset, stored next to the collections.
///
/// The training step runs outside of this crate; the manifest carries
/// everything it needs to know about how the dataset was prepared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub train: String,
    pub test: String,
    pub target_size: Resolution,
    pub train_iterations: u32,
}

impl Manifest {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            train: TRAIN.into(),
            test: TEST.into(),
            target_size: config.target_size,
            train_iterations: config.train_iterations,
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(
            dir.join(MANIFEST_FILE),
        )?)?)
    }
}
