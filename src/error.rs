use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("invalid GEO series accession: {0}")]
    InvalidExpressionAccession(String),

    #[error("no GEO series accession given (pass one on the command line or set `accession` in the config)")]
    MissingAccession,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("GEO request failed: {0}")]
    GeoHttp(String),

    #[error("GEO returned status {status}: {message}")]
    GeoStatus { status: u16, message: String },

    #[error("malformed SOFT file: {0}")]
    SoftParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("no valid sample tables found: {0}")]
    #[diagnostic(help("check the GEO accession; every sample needs an identifier column and a VALUE column"))]
    EmptyResult(String),

    #[error("matrix dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("chart rendering failed: {0}")]
    Render(String),
}
