use crate::detection::{Detection, Sentiment};
use crate::errors::Result;
use crate::traits::{ObjectDetector, SentimentClassifier};
use image::DynamicImage;

/// Detector returning the same detections for every image.
#[derive(Debug, Clone, Default)]
pub struct MockDetector {
    pub detections: Vec<Detection>,
}

impl MockDetector {
    pub const fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl ObjectDetector for MockDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

/// Keyword classifier: sentences mentioning "not" or "sad" are negative.
#[derive(Debug, Clone, Default)]
pub struct MockSentimentClassifier;

impl SentimentClassifier for MockSentimentClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let lower = text.to_lowercase();
        let label = if lower.contains("not") || lower.contains("sad") {
            "NEGATIVE"
        } else {
            "POSITIVE"
        };
        Ok(Sentiment {
            text: text.to_string(),
            label: label.to_string(),
            score: 0.99,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;
    use image::RgbImage;

    #[test]
    fn test_mock_detector_returns_fixture() -> Result<()> {
        let detections = vec![Detection::new("cat", 0.97, BoundingBox::new(10, 10, 50, 30))];
        let mock = MockDetector::new(detections.clone());

        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 64));
        assert_eq!(mock.detect(&image)?, detections);
        Ok(())
    }

    #[test]
    fn test_mock_classifier_batch() -> Result<()> {
        let texts = vec![
            "This is an amazing experience!".to_string(),
            "I am feeling very sad about this situation.".to_string(),
        ];
        let results = MockSentimentClassifier.classify_all(&texts)?;
        assert_eq!(results[0].label, "POSITIVE");
        assert_eq!(results[1].label, "NEGATIVE");
        assert_eq!(results[1].text, texts[1]);
        Ok(())
    }
}
