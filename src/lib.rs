pub mod config;
pub mod detection;
pub mod detector;
pub mod errors;
pub mod font;
pub mod labels;
pub mod mocks;
pub mod model;
pub mod output;
pub mod render;
pub mod sentiment;
pub mod traits;

use std::path::{Path, PathBuf};

use chrono::Local;
use image::{ImageFormat, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::Rng;
use walkdir::WalkDir;

pub use config::Config;
pub use detection::{BoundingBox, Detection, Sentiment};
pub use detector::DetrDetector;
pub use errors::{AnnotateError, Result};
pub use font::{FontLoad, LabelFont};
pub use labels::LabelMap;
pub use output::ResultPaths;
pub use render::render;
pub use sentiment::{read_sentences, SentimentModel};
pub use traits::*;

/// Where and how annotated images are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub result_dir: PathBuf,
    pub save: bool,
    /// Output extension; the source image's extension when `None`.
    pub format: Option<String>,
}

/// Detections for one source image and where they were written.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub source: PathBuf,
    pub detections: Vec<Detection>,
    pub saved: Option<ResultPaths>,
}

pub struct Annotation {
    pub report: DetectionReport,
    pub image: RgbImage,
}

/// Runs a detector over images and draws its detections.
pub struct Annotator<D: ObjectDetector> {
    detector: D,
    font: LabelFont,
    settings: OutputSettings,
}

impl<D: ObjectDetector> Annotator<D> {
    pub const fn new(detector: D, font: LabelFont, settings: OutputSettings) -> Self {
        Self {
            detector,
            font,
            settings,
        }
    }

    /// Detects, renders and (when enabled) saves a single image.
    pub fn annotate<R: Rng + ?Sized>(&self, path: &Path, rng: &mut R) -> Result<Annotation> {
        let img = image::open(path).map_err(|e| AnnotateError::ImageProcessing {
            path: path.display().to_string(),
            operation: "image load".to_string(),
            source: e,
        })?;

        let detections = self.detector.detect(&img)?;
        debug!("{} detections in {}", detections.len(), path.display());

        let image = render(&img.into_rgb8(), &detections, &self.font, rng);

        let saved = if self.settings.save {
            let paths = ResultPaths::new(
                &self.settings.result_dir,
                path,
                self.settings.format.as_deref(),
                &Local::now(),
            )?;
            paths.write(&image, &detections)?;
            info!("Saved annotated image to {}", paths.image.display());
            Some(paths)
        } else {
            None
        };

        Ok(Annotation {
            report: DetectionReport {
                source: path.to_path_buf(),
                detections,
                saved,
            },
            image,
        })
    }

    /// Annotates `input`, which is either one image or a directory searched
    /// recursively. Images are handled one after another; the first failure
    /// aborts the run.
    pub fn annotate_all<R: Rng + ?Sized>(
        &self,
        input: &Path,
        rng: &mut R,
    ) -> Result<Vec<DetectionReport>> {
        let images = self.collect_image_files(input)?;
        if images.is_empty() {
            info!("No supported images found in {}", input.display());
            return Ok(Vec::new());
        }

        let pb = if images.len() > 1 {
            let pb = ProgressBar::new(images.len() as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .map_err(|e| AnnotateError::Configuration {
                    message: e.to_string(),
                })?
                .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut reports = Vec::with_capacity(images.len());
        for path in &images {
            reports.push(self.annotate(path, rng)?.report);
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(reports)
    }

    fn collect_image_files(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if !input.exists() {
            return Err(AnnotateError::file_system(
                input,
                "reading image input",
                std::io::Error::new(std::io::ErrorKind::NotFound, "input does not exist"),
            ));
        }
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }

        let mut image_files: Vec<PathBuf> = WalkDir::new(input)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|path| path.is_file() && self.is_supported_image_format(path))
            .collect();
        image_files.sort();

        Ok(image_files)
    }

    /// Images this build can decode; formats behind disabled `image` features are skipped.
    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        ImageFormat::from_path(path).is_ok_and(|format| format.reading_enabled())
    }
}
