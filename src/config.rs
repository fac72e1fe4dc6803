use clap::{ArgGroup, Parser};
use image::ImageFormat;
use std::path::PathBuf;

use crate::detector::DEFAULT_THRESHOLD;
use crate::OutputSettings;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("task")
        .required(true)
        .multiple(true)
        .args(["image", "sentences", "sentences_file"])
))]
pub struct Config {
    /// Image to run object detection on, or a directory of images
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Sentences for sentiment analysis
    #[arg(long, num_args = 1..)]
    pub sentences: Option<Vec<String>>,

    /// File with one sentence per line for sentiment analysis
    #[arg(long)]
    pub sentences_file: Option<PathBuf>,

    /// Font used for detection captions; the built-in font is used if it cannot be loaded
    #[arg(long, default_value = "arial.ttf")]
    pub font: PathBuf,

    /// Caption font size in pixels
    #[arg(long, default_value_t = 20.0, value_parser = check_font_size)]
    pub font_size: f32,

    #[arg(short = 'm', long, default_value = "models/detr-resnet-50.onnx")]
    pub detection_model: PathBuf,

    /// Hugging Face `config.json` providing `id2label` for the detection model
    #[arg(long)]
    pub detection_labels: Option<PathBuf>,

    /// Minimum score (exclusive) for a detection to be reported
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_parser = check_threshold)]
    pub threshold: f32,

    #[arg(long, default_value = "models/distilbert-sst2.onnx")]
    pub sentiment_model: PathBuf,

    #[arg(long, default_value = "models/distilbert-sst2-tokenizer.json")]
    pub tokenizer: PathBuf,

    /// Hugging Face `config.json` providing `id2label` for the sentiment model
    #[arg(long)]
    pub sentiment_labels: Option<PathBuf>,

    #[arg(short, long, default_value = "example_results")]
    pub result_dir: PathBuf,

    /// Print results without writing annotated images
    #[arg(long)]
    pub no_save: bool,

    /// Output image format; defaults to the source image's extension
    #[arg(short, long, value_parser = check_format)]
    pub format: Option<String>,

    /// Seed for the box colors, for reproducible annotations
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,
}

impl Config {
    pub const fn runs_sentiment(&self) -> bool {
        self.sentences.is_some() || self.sentences_file.is_some()
    }

    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            result_dir: self.result_dir.clone(),
            save: !self.no_save,
            format: self.format.clone(),
        }
    }
}

fn check_format(s: &str) -> Result<String, String> {
    let supported: Vec<_> = ImageFormat::all()
        .filter(|f| f.writing_enabled())
        .flat_map(|f| f.extensions_str())
        .map(|s| format!("`{}`", s))
        .collect();
    let supported_message = format!("Supported formats: {}", supported.join(", "));

    let format = ImageFormat::from_extension(s)
        .ok_or(format!("{} is not supported. {}", s, supported_message))?;
    if !format.writing_enabled() {
        return Err(format!("{} is not supported. {}", s, supported_message));
    }

    Ok(s.to_string())
}

fn check_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be within [0, 1], got {}", value));
    }
    Ok(value)
}

fn check_font_size(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("font size must be greater than 0, got {}", value));
    }
    Ok(value)
}
