use std::io;

/// Errors raised while loading phonetic resources.
#[derive(Debug, thiserror::Error)]
pub enum PhoneticError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("feature table has no feature columns")]
    NoFeatures,

    #[error("invalid feature value {value:?} for segment {segment:?}")]
    InvalidFeatureValue { segment: String, value: String },

    #[error("mapping file is missing a {0:?} column")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, PhoneticError>;
