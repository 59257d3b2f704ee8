//! Error taxonomy for estimation and scoring runs.
//!
//! Per-candidate problems never surface here: the selector records them as
//! skips. Everything below is structural and stops the run.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EtymonError {
    #[error("unknown language label {label:?} (expected one of: {known})")]
    InvalidLabel { label: String, known: String },


    #[error("relatedness graph shape error: {0}")]
    GraphShape(String),

    #[error("language set is empty")]
    NoLanguages,

    #[error("duplicate language {0:?}")]
    DuplicateLanguage(String),

    #[error("dataset is missing column {0:?}")]
    MissingColumn(String),

    #[error("row on line {line} has {fields} fields, header has {expected}")]
    RaggedRow {
        line: u64,
        fields: usize,
        expected: usize,
    },

    #[error("failed to read {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("phonetic resource error: {0}")]
    Phonetic(#[from] etymon_phonetic::PhoneticError),
}

pub type Result<T> = std::result::Result<T, EtymonError>;
