use std::path::Path;

use image::{
    imageops::{self, FilterType},
    DynamicImage, RgbImage,
};
use log::debug;
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::{session::Session, value::TensorRef};
use parking_lot::Mutex;

use crate::{
    detection::{BoundingBox, Detection},
    errors::Result,
    labels::LabelMap,
    model::{argmax, build_session, softmax},
    traits::ObjectDetector,
};

const SHORTEST_EDGE: u32 = 800;
const LONGEST_EDGE: u32 = 1333;
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// DETR object detector exported to ONNX (`pixel_values` in, `logits` and
/// `pred_boxes` out).
pub struct DetrDetector {
    session: Mutex<Session>,
    labels: LabelMap,
    threshold: f32,
}

impl DetrDetector {
    pub fn new(model_path: &Path, device_id: i32, labels: LabelMap, threshold: f32) -> Result<Self> {
        let session = build_session(model_path, device_id)?;
        Ok(Self {
            session: Mutex::new(session),
            labels,
            threshold,
        })
    }
}

impl ObjectDetector for DetrDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let rgb = image.to_rgb8();
        let tensor = preprocess(&rgb);

        let mut session = self.session.lock();
        let outputs =
            session.run(ort::inputs!["pixel_values" => TensorRef::from_array_view(&tensor)?])?;
        let logits = outputs["logits"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix3>()?;
        let boxes = outputs["pred_boxes"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix3>()?;

        Ok(postprocess(
            logits,
            boxes,
            rgb.dimensions(),
            self.threshold,
            &self.labels,
        ))
    }
}

/// Output size for an input of `(width, height)`: short side scaled to 800
/// unless that pushes the long side past 1333.
pub fn target_size(width: u32, height: u32) -> (u32, u32) {
    let (short, long) = (width.min(height) as f32, width.max(height) as f32);
    let mut size = SHORTEST_EDGE as f32;
    if long / short * size > LONGEST_EDGE as f32 {
        size = (LONGEST_EDGE as f32 * short / long).round();
    }

    if width <= height {
        let scaled = (size * height as f32 / width as f32) as u32;
        (size as u32, scaled.max(1))
    } else {
        let scaled = (size * width as f32 / height as f32) as u32;
        (scaled.max(1), size as u32)
    }
}

/// Resizes and normalizes an image into a `[1, 3, H, W]` tensor.
pub fn preprocess(image: &RgbImage) -> Array4<f32> {
    let (width, height) = target_size(image.width(), image.height());
    let resized = imageops::resize(image, width, height, FilterType::Triangle);

    let channels = resized.as_ndarray3();
    Array3::from_shape_fn(channels.raw_dim(), |(c, y, x)| {
        (f32::from(channels[[c, y, x]]) / 255.0 - MEAN[c]) / STD[c]
    })
    .insert_axis(Axis(0))
}

/// Turns raw DETR outputs into pixel-space detections above `threshold`.
///
/// The last logit of every query is the "no object" class and is ignored.
/// Boxes are normalized `(cx, cy, w, h)` and are truncated to whole pixels;
/// boxes that collapse to zero area are dropped.
pub fn postprocess(
    logits: ArrayView3<f32>,
    boxes: ArrayView3<f32>,
    (width, height): (u32, u32),
    threshold: f32,
    labels: &LabelMap,
) -> Vec<Detection> {
    let num_classes = logits.shape()[2].saturating_sub(1);
    let (w, h) = (width as f32, height as f32);

    logits
        .index_axis(Axis(0), 0)
        .outer_iter()
        .zip(boxes.index_axis(Axis(0), 0).outer_iter())
        .filter_map(|(query, bbox)| {
            let probs = softmax(query);
            let (class, score) = argmax(probs.slice(s![..num_classes]))?;
            if score <= threshold {
                return None;
            }

            let (cx, cy, bw, bh) = (bbox[0], bbox[1], bbox[2], bbox[3]);
            let bbox = BoundingBox::new(
                ((cx - bw / 2.0) * w) as i32,
                ((cy - bh / 2.0) * h) as i32,
                ((cx + bw / 2.0) * w) as i32,
                ((cy + bh / 2.0) * h) as i32,
            );
            if !bbox.is_valid() {
                debug!("Dropping degenerate box {:?} for class {}", bbox, class);
                return None;
            }

            Some(Detection::new(labels.name(class), score, bbox))
        })
        .collect()
}
