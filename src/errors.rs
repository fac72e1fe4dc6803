use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the annotation tool.
///
/// Each variant carries the context of its error domain (filesystem, image
/// decoding, model execution, ...) so callers can report what failed and where
/// without parsing strings.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Model error: {operation} failed: {message}")]
    Model { operation: String, message: String },

    #[error("Serialization error: {operation} failed")]
    Serialization {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

impl AnnotateError {
    /// Wraps any displayable runtime/tokenizer error as a model error.
    ///
    /// ort builder errors carry the builder itself and the tokenizers crate
    /// returns boxed trait objects, so only the message is kept.
    pub fn model(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Model {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that knows the path and operation should build
/// `AnnotateError::FileSystem` directly; this is the fallback for `?`.
impl From<std::io::Error> for AnnotateError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

impl From<image::ImageError> for AnnotateError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: err,
        }
    }
}

impl From<ort::Error> for AnnotateError {
    fn from(err: ort::Error) -> Self {
        Self::model("ort operation", err)
    }
}

/// Shape errors come out of tensor handling around inference, so they are
/// reported as model errors.
impl From<ndarray::ShapeError> for AnnotateError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::model("tensor shape conversion", err)
    }
}

impl From<serde_json::Error> for AnnotateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            operation: "json".to_string(),
            source: err,
        }
    }
}
