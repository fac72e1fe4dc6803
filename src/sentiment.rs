use std::{fs, path::Path};

use ndarray::prelude::*;
use ort::{session::Session, value::TensorRef};
use parking_lot::Mutex;
use tokenizers::{Tokenizer, TruncationParams};

use crate::{
    detection::Sentiment,
    errors::{AnnotateError, Result},
    labels::LabelMap,
    model::{argmax, build_session, softmax},
    traits::SentimentClassifier,
};

const MAX_SEQUENCE_LENGTH: usize = 512;

/// Sequence classifier (e.g. DistilBERT fine-tuned on SST-2) exported to
/// ONNX with `input_ids`/`attention_mask` inputs and a `logits` output.
pub struct SentimentModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: LabelMap,
}

impl SentimentModel {
    pub fn new(
        model_path: &Path,
        tokenizer_path: &Path,
        device_id: i32,
        labels: LabelMap,
    ) -> Result<Self> {
        let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            AnnotateError::model(format!("loading tokenizer {}", tokenizer_path.display()), e)
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| AnnotateError::model("tokenizer truncation setup", e))?;

        let session = build_session(model_path, device_id)?;
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }

    fn encode(&self, text: &str) -> Result<(Array2<i64>, Array2<i64>)> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| AnnotateError::model("tokenization", e))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| i64::from(m))
            .collect();
        let len = ids.len();

        Ok((
            Array2::from_shape_vec((1, len), ids)?,
            Array2::from_shape_vec((1, len), mask)?,
        ))
    }
}

impl SentimentClassifier for SentimentModel {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let (input_ids, attention_mask) = self.encode(text)?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![
            "input_ids" => TensorRef::from_array_view(&input_ids)?,
            "attention_mask" => TensorRef::from_array_view(&attention_mask)?
        ])?;
        let logits = outputs["logits"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix2>()?;

        let probs = softmax(logits.row(0));
        let (index, score) = argmax(probs.view())
            .ok_or_else(|| AnnotateError::model("sentiment inference", "model returned no logits"))?;

        Ok(Sentiment {
            text: text.to_string(),
            label: self.labels.name(index),
            score,
        })
    }
}

/// Reads one sentence per line, trimming whitespace and skipping blank lines.
pub fn read_sentences(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| AnnotateError::file_system(path, "reading sentences file", e))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
