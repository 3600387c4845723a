use thiserror::Error;

use crate::api::ViewId;

pub type FigureResult<T> = Result<T, FigureError>;

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("invalid figure size: width={width}, height={height}")]
    InvalidFigureSize { width: f64, height: f64 },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown view: {0:?}")]
    UnknownView(ViewId),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("render backend error: {0}")]
    Backend(String),

    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
