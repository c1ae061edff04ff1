//! Hand detection with a trained ONNX model.
//!
//! The network takes a single `[1, 3, H, W]` RGB input scaled to `[0, 1]`
//! and produces two output tensors: normalized center-form box coordinates
//! of shape `[1, N, 4]` and per-class confidences of shape `[1, N, 2]`, the
//! columns ordered like the sorted training labels (`left`, `right`).
//! Unused prediction rows are zero padded and fall below any threshold.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, ensure, Context};
use image::RgbImage;
use tract_onnx::prelude::{
    tract_ndarray::{self, ArrayViewD},
    tvec, Framework, Graph, InferenceModelExt, SimplePlan, TValue, Tensor, TypedFact, TypedOp,
};

use crate::annotation::{BoundingBox, Side};
use crate::draw;
use crate::letterbox::{Letterbox, ScaleFactor};
use crate::resolution::Resolution;
use crate::timer::Timer;

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A hand detected in an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Box around the hand, in the coordinate space of the detected image.
    pub coordinates: BoundingBox,
    pub label: Side,
    pub confidence: f32,
}

impl Detection {
    /// Draws this detection onto the image it was produced from.
    pub fn draw(&self, image: &mut RgbImage) {
        let color = draw::side_color(self.label);
        draw::draw_box(image, &self.coordinates).color(color);

        let (left, top) = self.coordinates.top_left();
        draw::draw_label(
            image,
            left.round() as i32,
            top.round() as i32 - 2,
            &format!("{} {:.2}", self.label, self.confidence),
        )
        .color(color)
        .align_bottom()
        .align_left();
    }
}

/// Neural-network based hand detector.
#[derive(Debug)]
pub struct HandDetector {
    model: Model,
    letterbox: Letterbox,
    t_letterbox: Timer,
    t_infer: Timer,
    t_decode: Timer,
}

impl HandDetector {
    /// Default confidence threshold for keeping a prediction.
    pub const DEFAULT_THRESHOLD: f32 = 0.1;

    /// Loads a trained hand detection model from an ONNX file.
    ///
    /// The network has to take exactly one NCHW image input. Its resolution
    /// becomes the letterbox target for every image passed to
    /// [`detect`][Self::detect].
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        match path.extension() {
            Some(ext) if ext == "onnx" => {}
            _ => bail!("hand detection model path must have `.onnx` extension"),
        }

        let model = tract_onnx::onnx()
            .model_for_path(path)?
            .into_optimized()?
            .into_runnable()?;

        if model.model().inputs.len() != 1 {
            bail!(
                "hand detection network has to take exactly 1 input, this one takes {}",
                model.model().inputs.len(),
            );
        }

        let fact = model.model().input_fact(0)?;
        let tensor_shape = fact
            .shape
            .as_concrete()
            .context("network input shape is symbolic")?;
        let (w, h) = match tensor_shape {
            [1, 3, h, w] => (*w, *h),
            _ => bail!("unsupported input shape {tensor_shape:?}, expected [1, 3, H, W]"),
        };
        let (w, h): (u32, u32) = (w.try_into()?, h.try_into()?);
        let input_res = Resolution::new(w, h);

        log::debug!(
            "loaded hand detection model from {} (input size {input_res})",
            path.display(),
        );

        Ok(Self {
            model,
            letterbox: Letterbox::new(input_res),
            t_letterbox: Timer::new("letterbox"),
            t_infer: Timer::new("infer"),
            t_decode: Timer::new("decode"),
        })
    }

    /// Returns the image size expected by the network.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.letterbox.target()
    }

    /// Detects hands in `image`, keeping every prediction whose confidence
    /// exceeds `threshold`.
    ///
    /// The image may have any size. It is letterboxed onto the network input
    /// and the predicted boxes are mapped back, so the returned coordinates
    /// are in the coordinate space of `image`.
    pub fn detect(&mut self, image: &RgbImage, threshold: f32) -> anyhow::Result<Vec<Detection>> {
        let letterboxed = self.t_letterbox.time(|| self.letterbox.apply(image));

        let input_res = self.input_resolution();
        let (h, w) = (input_res.height() as usize, input_res.width() as usize);
        let input = &letterboxed.image;
        let outputs = self.t_infer.time(|| {
            let tensor = Tensor::from(tract_ndarray::Array4::from_shape_fn(
                (1, 3, h, w),
                |(_, c, y, x)| f32::from(input[(x as u32, y as u32)][c]) / 255.0,
            ));
            self.model.run(tvec!(TValue::from_const(Arc::new(tensor))))
        })?;

        ensure!(
            outputs.len() == 2,
            "expected 2 output tensors (coordinates and confidence), got {}",
            outputs.len(),
        );
        let coordinates = outputs[0].to_array_view::<f32>()?;
        let confidence = outputs[1].to_array_view::<f32>()?;

        self.t_decode.time(|| {
            decode_predictions(
                coordinates,
                confidence,
                input_res,
                letterboxed.scale,
                threshold,
            )
        })
    }

    /// Returns profiling timers for letterboxing, neural inference, and prediction decoding.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_letterbox, &self.t_infer, &self.t_decode]
    }
}

/// Turns raw network outputs into [`Detection`]s in source image space.
fn decode_predictions(
    coordinates: ArrayViewD<'_, f32>,
    confidence: ArrayViewD<'_, f32>,
    target: Resolution,
    scale: ScaleFactor,
    threshold: f32,
) -> anyhow::Result<Vec<Detection>> {
    let rows = match (coordinates.shape(), confidence.shape()) {
        ([1, rows, 4], [1, conf_rows, 2]) if rows == conf_rows => *rows,
        (coord_shape, conf_shape) => bail!(
            "mismatched prediction shapes: coordinates {coord_shape:?}, confidence {conf_shape:?}",
        ),
    };

    let mut detections = Vec::new();
    for i in 0..rows {
        let left = confidence[[0, i, 0]];
        let right = confidence[[0, i, 1]];
        let conf = left.max(right);
        if conf <= threshold {
            continue;
        }

        let bbox = BoundingBox::from_center(
            coordinates[[0, i, 0]] * target.width() as f32,
            coordinates[[0, i, 1]] * target.height() as f32,
            coordinates[[0, i, 2]] * target.width() as f32,
            coordinates[[0, i, 3]] * target.height() as f32,
        );
        detections.push(Detection {
            coordinates: scale.to_source(&bbox),
            label: side_of(left, right),
            confidence: conf,
        });
    }
    Ok(detections)
}

/// Chooses the side with the higher confidence. Ties go to [`Side::Left`],
/// the first of the two confidence columns.
fn side_of(left: f32, right: f32) -> Side {
    if right > left {
        Side::Right
    } else {
        Side::Left
    }
}
