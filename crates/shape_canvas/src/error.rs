use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Invalid canvas dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported shape kind '{0}'. Use rectangle, triangle, square, or rhombus")]
    UnsupportedShapeKind(String),

    #[error("Invalid axis '{0}'. Axis must be either 'horizontal' or 'vertical'")]
    InvalidAxis(String),

    #[error("Invalid stroke thickness {0}: must be non-zero and at most 32767 in magnitude (negative fills the shape)")]
    InvalidThickness(i32),

    #[error("Transform is not invertible: {0}")]
    SingularTransform(String),

    #[error("Image not found at {}", path.display())]
    ImageNotFound { path: PathBuf },

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Binary image not available, convert the image to binary first")]
    NoBinaryImage,

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
