use std::path::Path;

use ndarray::prelude::*;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};

use crate::errors::{AnnotateError, Result};

/// Opens an ONNX model, preferring TensorRT then CUDA on `device_id`.
///
/// Providers that are unavailable at runtime are skipped by ort and the
/// session runs on the CPU.
pub(crate) fn build_session(model_path: &Path, device_id: i32) -> Result<Session> {
    if !model_path.exists() {
        return Err(AnnotateError::file_system(
            model_path,
            "opening model",
            std::io::Error::new(std::io::ErrorKind::NotFound, "model file does not exist"),
        ));
    }

    SessionBuilder::new()
        .map_err(|e| AnnotateError::model("session builder init", e))?
        .with_execution_providers([
            TensorRTExecutionProvider::default()
                .with_device_id(device_id)
                .build(),
            CUDAExecutionProvider::default()
                .with_device_id(device_id)
                .build(),
        ])
        .map_err(|e| AnnotateError::model("execution provider setup", e))?
        .with_memory_pattern(true)
        .map_err(|e| AnnotateError::model("memory pattern setup", e))?
        .commit_from_file(model_path)
        .map_err(|e| {
            AnnotateError::model(format!("loading model file {}", model_path.display()), e)
        })
}

/// Numerically stable softmax over one row of logits.
pub(crate) fn softmax(logits: ArrayView1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Index and value of the largest entry, `None` for an empty view.
pub(crate) fn argmax(values: ArrayView1<f32>) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, best_v)) if best_v >= v => best,
            _ => Some((i, v)),
        })
}
