use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use image::{Rgb, RgbImage};
use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;

use detect_annotate_rs::{
    mocks::{MockDetector, MockSentimentClassifier},
    read_sentences, render, AnnotateError, Annotator, BoundingBox, Config, Detection, LabelFont,
    OutputSettings, SentimentClassifier,
};

fn fixture_detections() -> Vec<Detection> {
    vec![
        Detection::new("cat", 0.97, BoundingBox::new(10, 10, 50, 30)),
        Detection::new("remote", 0.61, BoundingBox::new(40, 20, 110, 70)),
    ]
}

fn settings(result_dir: PathBuf, format: Option<&str>) -> OutputSettings {
    OutputSettings {
        result_dir,
        save: true,
        format: format.map(String::from),
    }
}

fn write_source(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(120, 80, |x, y| Rgb([x as u8, y as u8, 90]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_config_accepts_all_tasks() {
    let config = Config::try_parse_from([
        "detect-annotate-rs",
        "--image",
        "example_images/people.jpeg",
        "--font",
        "fonts/DejaVuSans.ttf",
        "--sentences",
        "I am feeling great today!",
        "--sentences-file",
        "sentences.txt",
        "--seed",
        "7",
        "-t",
        "0.9",
    ])
    .unwrap();

    assert_eq!(config.font, PathBuf::from("fonts/DejaVuSans.ttf"));
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.threshold, 0.9);
    assert_eq!(config.sentences_file, Some(PathBuf::from("sentences.txt")));
}

#[test]
fn test_annotate_saves_image_and_detections() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), "people.png");
    let result_dir = temp_dir.path().join("example_results");

    let annotator = Annotator::new(
        MockDetector::new(fixture_detections()),
        LabelFont::builtin(8.0),
        settings(result_dir.clone(), None),
    );
    let annotation = annotator
        .annotate(&source, &mut StdRng::seed_from_u64(42))
        .unwrap();

    let saved = annotation.report.saved.clone().expect("results are saved");
    assert!(saved.image.starts_with(&result_dir));
    let stem = saved.image.file_stem().unwrap().to_str().unwrap();
    assert!(stem.starts_with("people_"), "unexpected name {}", stem);
    assert_eq!(saved.image.extension().unwrap(), "png");

    let written = image::open(&saved.image).unwrap().into_rgb8();
    assert_eq!(written, annotation.image);

    let json: Vec<Detection> =
        serde_json::from_str(&fs::read_to_string(&saved.json).unwrap()).unwrap();
    assert_eq!(json, fixture_detections());
}

#[test]
fn test_annotation_matches_seeded_render() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), "cat.png");
    let font = LabelFont::builtin(8.0);

    let annotator = Annotator::new(
        MockDetector::new(fixture_detections()),
        font.clone(),
        OutputSettings {
            result_dir: temp_dir.path().join("out"),
            save: false,
            format: None,
        },
    );
    let annotation = annotator
        .annotate(&source, &mut StdRng::seed_from_u64(3))
        .unwrap();

    let original = image::open(&source).unwrap().into_rgb8();
    let expected = render(
        &original,
        &fixture_detections(),
        &font,
        &mut StdRng::seed_from_u64(3),
    );
    assert_eq!(annotation.image, expected);
}

#[test]
fn test_no_detections_saves_unchanged_image() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), "empty.png");

    let annotator = Annotator::new(
        MockDetector::default(),
        LabelFont::builtin(8.0),
        settings(temp_dir.path().join("out"), None),
    );
    let annotation = annotator
        .annotate(&source, &mut StdRng::seed_from_u64(0))
        .unwrap();

    let original = image::open(&source).unwrap().into_rgb8();
    assert_eq!(annotation.image, original);
    let saved = annotation.report.saved.unwrap();
    assert_eq!(fs::read_to_string(saved.json).unwrap().trim(), "[]");
}

#[test]
fn test_directory_input_with_format_override() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("images");
    fs::create_dir_all(input.join("more")).unwrap();
    write_source(&input, "one.png");
    write_source(&input.join("more"), "two.png");
    fs::write(input.join("readme.txt"), "skip me").unwrap();
    let result_dir = temp_dir.path().join("results");

    let annotator = Annotator::new(
        MockDetector::new(fixture_detections()),
        LabelFont::builtin(8.0),
        settings(result_dir.clone(), Some("jpg")),
    );
    let reports = annotator
        .annotate_all(&input, &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.detections.len(), 2);
        let saved = report.saved.as_ref().unwrap();
        assert_eq!(saved.image.extension().unwrap(), "jpg");
        assert!(saved.image.exists());
        assert!(saved.json.exists());
    }
    assert_eq!(fs::read_dir(&result_dir).unwrap().count(), 4);
}

#[test]
fn test_missing_image_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let annotator = Annotator::new(
        MockDetector::default(),
        LabelFont::builtin(8.0),
        settings(temp_dir.path().join("out"), None),
    );

    let result = annotator.annotate(
        &temp_dir.path().join("missing.png"),
        &mut StdRng::seed_from_u64(0),
    );
    assert!(matches!(result, Err(AnnotateError::ImageProcessing { .. })));
}

#[test]
fn test_fallback_font_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), "people.png");

    let load = LabelFont::load(&temp_dir.path().join("arial.ttf"), 20.0);
    assert!(load.is_fallback());

    let annotator = Annotator::new(
        MockDetector::new(fixture_detections()),
        load.into_font(),
        settings(temp_dir.path().join("out"), None),
    );
    let annotation = annotator
        .annotate(&source, &mut StdRng::seed_from_u64(8))
        .unwrap();
    assert!(annotation.image.pixels().any(|p| *p == Rgb([255, 255, 255])));
}

#[test]
fn test_sentences_file_with_mock_classifier() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sentences.txt");
    fs::write(
        &path,
        "I am feeling great today!\n\nI am not happy with the service.\nThis is an amazing experience!\n",
    )
    .unwrap();

    let sentences = read_sentences(&path).unwrap();
    let results = MockSentimentClassifier.classify_all(&sentences).unwrap();

    let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["POSITIVE", "NEGATIVE", "POSITIVE"]);

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[1]["text"], "I am not happy with the service.");
}
