use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("stage not found: {0}")]
    StageNotFound(Uuid),

    #[error("kernel is {kernel}x{kernel} but sample patch is {patch}x{patch}")]
    DimensionMismatch { kernel: usize, patch: usize },

    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("preset file version {got} is newer than supported version {max}")]
    VersionTooNew { got: String, max: String },

    #[error("preset file version {got} is older than minimum supported version {min}")]
    VersionTooOld { got: String, min: String },

    #[error("invalid preset file: {0}")]
    InvalidPresetFile(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
