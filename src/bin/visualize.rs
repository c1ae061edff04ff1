//! Runs a trained hand detection model on a single image and renders the
//! detections, to a file and optionally to a preview window.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use egohands::detector::HandDetector;
use image::RgbImage;
use itertools::Itertools;
use minifb::{Key, Window, WindowOptions};

/// Detects hands in an image and renders the detections.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Image to run the detector on.
    image: PathBuf,

    /// Trained hand detection model (`.onnx`).
    model: PathBuf,

    /// Where to save the annotated image. Defaults to `<image>_annotated.png`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Minimum confidence for keeping a detection.
    #[arg(long, default_value_t = HandDetector::DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Do not open a preview window.
    #[arg(long)]
    no_window: bool,
}

fn main() -> anyhow::Result<()> {
    egohands::init_logger!();

    let args = Args::parse();
    let mut detector = HandDetector::load(&args.model)?;
    let image = image::open(&args.image)?.to_rgb8();

    let detections = detector.detect(&image, args.threshold)?;
    log::info!(
        "{} detection(s) in {} ({})",
        detections.len(),
        args.image.display(),
        detector.timers().into_iter().format(", "),
    );

    let mut annotated = image;
    for detection in &detections {
        log::debug!("{detection:?}");
        detection.draw(&mut annotated);
    }

    let out = match args.out {
        Some(path) => path,
        None => {
            let stem = args
                .image
                .file_stem()
                .context("image path has no file name")?;
            args.image
                .with_file_name(format!("{}_annotated.png", stem.to_string_lossy()))
        }
    };
    annotated.save(&out)?;
    log::info!("saved annotated image to {}", out.display());

    if !args.no_window {
        show(&annotated)?;
    }
    Ok(())
}

/// Displays `image` in a window until it is closed or escape is pressed.
fn show(image: &RgbImage) -> anyhow::Result<()> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let buffer: Vec<u32> = image
        .as_raw()
        .chunks_exact(3)
        .map(|px| (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2]))
        .collect();

    let mut window = Window::new("hand detections", width, height, WindowOptions::default())?;
    window.limit_update_rate(Some(Duration::from_micros(1_000_000 / 60)));
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window.update_with_buffer(&buffer, width, height)?;
    }
    Ok(())
}
