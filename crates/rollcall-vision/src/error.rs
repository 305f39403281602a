//! Error types for vision operations

use thiserror::Error;

/// Errors from frame sources, embedders, and sinks
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Embedder failed: {0}")]
    EmbedFailed(String),

    #[error("Sink failed: {0}")]
    SinkFailed(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VisionResult<T> = Result<T, VisionError>;
