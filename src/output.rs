use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbImage};

use crate::detection::Detection;
use crate::errors::{AnnotateError, Result};

/// Extension used when neither the configuration nor the source names one.
const DEFAULT_EXTENSION: &str = "png";

/// Destination of one annotated image and its detection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaths {
    pub image: PathBuf,
    pub json: PathBuf,
}

impl ResultPaths {
    /// `{stem}_{YYYYmmdd_HHMMSS}.{ext}` and `.json` siblings under `result_dir`.
    ///
    /// `extension` overrides the source file's extension.
    pub fn new(
        result_dir: &Path,
        source: &Path,
        extension: Option<&str>,
        timestamp: &DateTime<Local>,
    ) -> Result<Self> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AnnotateError::Validation {
                field: source.display().to_string(),
                reason: "has no usable file name".to_string(),
            })?;
        let extension = extension
            .or_else(|| source.extension().and_then(|e| e.to_str()))
            .unwrap_or(DEFAULT_EXTENSION);

        let base = format!("{}_{}", stem, timestamp_tag(timestamp));
        Ok(Self {
            image: result_dir.join(format!("{}.{}", base, extension)),
            json: result_dir.join(format!("{}.json", base)),
        })
    }

    /// Writes the annotated image and the pretty-printed detection list,
    /// creating the result directory when missing.
    pub fn write(&self, image: &RgbImage, detections: &[Detection]) -> Result<()> {
        if let Some(parent) = self.image.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AnnotateError::file_system(parent, "creating result directory", e))?;
        }

        let format = ImageFormat::from_path(&self.image).map_err(|e| {
            AnnotateError::ImageProcessing {
                path: self.image.display().to_string(),
                operation: "output format detection".to_string(),
                source: e,
            }
        })?;
        image
            .save_with_format(&self.image, format)
            .map_err(|e| AnnotateError::ImageProcessing {
                path: self.image.display().to_string(),
                operation: "saving annotated image".to_string(),
                source: e,
            })?;

        let json = serde_json::to_string_pretty(detections)?;
        fs::write(&self.json, json)
            .map_err(|e| AnnotateError::file_system(&self.json, "writing detection results", e))
    }
}

pub fn timestamp_tag(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%Y%m%d_%H%M%S").to_string()
}
