use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TcxError>;

#[derive(Debug, Error)]
pub enum TcxError {
    #[error("failed to read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("expected element <{0}> not found")]
    MissingElement(&'static str),

    #[error("invalid value '{value}' in <{element}>")]
    InvalidValue {
        element: &'static str,
        value: String,
    },

    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("lap index {lap} out of range for activity with {laps} laps")]
    LapOutOfRange { lap: usize, laps: usize },
}
