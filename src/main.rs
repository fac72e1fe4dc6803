use std::path::Path;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};

use detect_annotate_rs::{
    read_sentences, Annotator, Config, DetrDetector, FontLoad, LabelFont, LabelMap, Sentiment,
    SentimentClassifier, SentimentModel,
};

fn main() -> Result<()> {
    // model runtimes are chatty at info level
    env_logger::Builder::from_env(Env::default().default_filter_or("info,ort=error")).init();

    let config = Config::parse();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(image) = &config.image {
        run_detection(&config, image, &mut rng)?;
    }

    if config.runs_sentiment() {
        let classifier = load_sentiment_model(&config)?;

        if let Some(sentences) = &config.sentences {
            let results = classifier.classify_all(sentences)?;
            print_sentiment("Sentiment Analysis Results:", &results)?;
        }

        if let Some(path) = &config.sentences_file {
            let sentences = read_sentences(path)
                .with_context(|| format!("Failed to read sentences: {}", path.display()))?;
            let results = classifier.classify_all(&sentences)?;
            print_sentiment("Sentiment Analysis Results (from file):", &results)?;
        }
    }

    Ok(())
}

fn run_detection(config: &Config, image: &Path, rng: &mut StdRng) -> Result<()> {
    ensure!(image.exists(), "Image path does not exist: {}", image.display());
    ensure!(
        config.detection_model.exists(),
        "Detection model does not exist: {}",
        config.detection_model.display()
    );

    let font = match LabelFont::load(&config.font, config.font_size) {
        FontLoad::Loaded(font) => {
            info!("Loaded font {}", config.font.display());
            font
        }
        FontLoad::Fallback { font, reason } => {
            warn!("Using built-in font: {}", reason);
            font
        }
    };

    let labels = match &config.detection_labels {
        Some(path) => LabelMap::from_hf_config(path)?,
        None => LabelMap::detr_coco(),
    };
    let detector = DetrDetector::new(
        &config.detection_model,
        config.device_id,
        labels,
        config.threshold,
    )
    .context("Failed to load detection model")?;

    let annotator = Annotator::new(detector, font, config.output_settings());
    let reports = annotator.annotate_all(image, rng)?;

    for report in &reports {
        if reports.len() == 1 {
            println!("Object Detection Results:");
        } else {
            println!("Object Detection Results ({}):", report.source.display());
        }
        println!("{}", serde_json::to_string_pretty(&report.detections)?);
    }

    Ok(())
}

fn load_sentiment_model(config: &Config) -> Result<SentimentModel> {
    ensure!(
        config.sentiment_model.exists(),
        "Sentiment model does not exist: {}",
        config.sentiment_model.display()
    );
    ensure!(
        config.tokenizer.exists(),
        "Tokenizer does not exist: {}",
        config.tokenizer.display()
    );

    let labels = match &config.sentiment_labels {
        Some(path) => LabelMap::from_hf_config(path)?,
        None => LabelMap::sst2(),
    };
    SentimentModel::new(
        &config.sentiment_model,
        &config.tokenizer,
        config.device_id,
        labels,
    )
    .context("Failed to load sentiment model")
}

fn print_sentiment(header: &str, results: &[Sentiment]) -> Result<()> {
    println!("{}", header);
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}
