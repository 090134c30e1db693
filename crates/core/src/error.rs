//! Error types for firescar

use thiserror::Error;

/// Main error type for firescar operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two rasters that must be co-registered differ in grid or reference frame
    #[error("Rasters are not co-registered: {what} differs (expected {expected}, got {actual})")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid threshold table: {0}")]
    InvalidThresholdTable(String),

    /// Percentage denominator would be zero
    #[error("Region '{region}' contains no valid classified pixels")]
    NoValidPixels { region: String },

    #[error("Region '{region}' spans {pixels} pixels, exceeding the budget of {max_pixels}")]
    RegionTooLarge {
        region: String,
        pixels: usize,
        max_pixels: usize,
    },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Error::Tiff(e.to_string())
    }
}

/// Result type alias for firescar operations
pub type Result<T> = std::result::Result<T, Error>;
