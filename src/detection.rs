use serde::{Deserialize, Serialize};

/// Pixel-space bounding box, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl BoundingBox {
    pub const fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// `true` when the box spans at least one pixel on both axes past its origin.
    pub const fn is_valid(&self) -> bool {
        self.xmin < self.xmax && self.ymin < self.ymax
    }

    pub fn width(&self) -> u32 {
        (self.xmax - self.xmin + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.ymax - self.ymin + 1).max(0) as u32
    }
}

/// One labeled box produced by an object-detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub score: f32,
    pub label: String,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f32, bbox: BoundingBox) -> Self {
        Self {
            score,
            label: label.into(),
            bbox,
        }
    }

    /// Caption drawn next to the box, e.g. `cat (0.97)`.
    pub fn caption(&self) -> String {
        format!("{} ({:.2})", self.label, self.score)
    }
}

/// Sentence-level classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub text: String,
    pub label: String,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_rounds_to_two_decimals() {
        let det = Detection::new("cat", 0.966, BoundingBox::new(10, 10, 50, 30));
        assert_eq!(det.caption(), "cat (0.97)");
    }

    #[test]
    fn test_box_dimensions_are_inclusive() {
        let bbox = BoundingBox::new(10, 10, 50, 30);
        assert_eq!(bbox.width(), 41);
        assert_eq!(bbox.height(), 21);
        assert!(bbox.is_valid());
        assert!(!BoundingBox::new(5, 5, 5, 9).is_valid());
    }

    #[test]
    fn test_detection_json_shape() -> serde_json::Result<()> {
        let det = Detection::new("dog", 0.5, BoundingBox::new(1, 2, 3, 4));
        let value = serde_json::to_value(&det)?;
        assert_eq!(value["label"], "dog");
        assert_eq!(value["box"]["xmin"], 1);
        assert_eq!(value["box"]["ymax"], 4);
        Ok(())
    }
}
