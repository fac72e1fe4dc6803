use crate::detection::{Detection, Sentiment};
use crate::errors::Result;
use image::DynamicImage;

/// Object-detection model abstraction.
///
/// The annotation pipeline only depends on this trait, so tests can swap the
/// ONNX model for a fixed list of detections.
pub trait ObjectDetector: Send + Sync {
    /// Detections for `image`, in the order they should be drawn.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Sentence-level sentiment model abstraction.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment>;

    /// Classifies each sentence in turn, stopping at the first failure.
    fn classify_all(&self, texts: &[String]) -> Result<Vec<Sentiment>> {
        texts.iter().map(|text| self.classify(text)).collect()
    }
}
