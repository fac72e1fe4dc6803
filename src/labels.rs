use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::errors::{AnnotateError, Result};

/// Class names of `facebook/detr-resnet-50`, indexed by COCO category id.
const DETR_COCO: [&str; 91] = [
    "N/A", "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "N/A", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "N/A", "backpack",
    "umbrella", "N/A", "N/A", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard",
    "sports ball", "kite", "baseball bat", "baseball glove", "skateboard", "surfboard",
    "tennis racket", "bottle", "N/A", "wine glass", "cup", "fork", "knife", "spoon", "bowl",
    "banana", "apple", "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut",
    "cake", "chair", "couch", "potted plant", "bed", "N/A", "dining table", "N/A", "N/A",
    "toilet", "N/A", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone", "microwave",
    "oven", "toaster", "sink", "refrigerator", "N/A", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

const SST2: [&str; 2] = ["NEGATIVE", "POSITIVE"];

/// Maps a model's class index to a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct HfConfig {
    id2label: HashMap<String, String>,
}

impl LabelMap {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn detr_coco() -> Self {
        Self::new(DETR_COCO)
    }

    pub fn sst2() -> Self {
        Self::new(SST2)
    }

    /// Reads the `id2label` table of a Hugging Face `config.json`.
    pub fn from_hf_config(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AnnotateError::file_system(path, "reading label config", e))?;
        Self::from_hf_json(&content).map_err(|e| match e {
            AnnotateError::Validation { reason, .. } => AnnotateError::Validation {
                field: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    fn from_hf_json(content: &str) -> Result<Self> {
        let config: HfConfig = serde_json::from_str(content)?;

        let mut indexed = config
            .id2label
            .into_iter()
            .map(|(id, name)| {
                id.parse::<usize>()
                    .map(|id| (id, name))
                    .map_err(|_| AnnotateError::Validation {
                        field: "id2label".to_string(),
                        reason: format!("has non-numeric id `{}`", id),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        indexed.sort_by_key(|(id, _)| *id);

        let len = indexed.last().map_or(0, |(id, _)| id + 1);
        let mut names: Vec<String> = (0..len).map(fallback_name).collect();
        for (id, name) in indexed {
            names[id] = name;
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name for `index`, `LABEL_{index}` when the map has no entry.
    pub fn name(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| fallback_name(index))
    }
}

fn fallback_name(index: usize) -> String {
    format!("LABEL_{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let coco = LabelMap::detr_coco();
        assert_eq!(coco.len(), 91);
        assert_eq!(coco.name(17), "cat");
        assert_eq!(coco.name(90), "toothbrush");
        assert_eq!(coco.name(91), "LABEL_91");

        let sst2 = LabelMap::sst2();
        assert_eq!(sst2.name(1), "POSITIVE");
    }

    #[test]
    fn test_hf_config_with_gaps() -> Result<()> {
        let labels = LabelMap::from_hf_json(
            r#"{"architectures": ["X"], "id2label": {"2": "two", "0": "zero"}}"#,
        )?;
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(0), "zero");
        assert_eq!(labels.name(1), "LABEL_1");
        assert_eq!(labels.name(2), "two");
        Ok(())
    }

    #[test]
    fn test_hf_config_rejects_bad_ids() {
        let err = LabelMap::from_hf_json(r#"{"id2label": {"x": "bad"}}"#).unwrap_err();
        assert!(matches!(err, AnnotateError::Validation { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = LabelMap::from_hf_config(Path::new("/missing/config.json")).unwrap_err();
        assert!(matches!(err, AnnotateError::FileSystem { .. }));
    }
}
