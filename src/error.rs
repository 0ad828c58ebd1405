use thiserror::Error;

use crate::domain::field_error::ErrorList;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("{0}")]
    Validation(ErrorList),

    #[error("failed to construct connection to Engine platform {0}")]
    Connection(String),

    #[error("failed to connect to Engine platform {0}")]
    Authentication(String),

    #[error("Engine request failed: {0}")]
    Engine(String),

    #[error("failed to fetch base image {url}: {reason}")]
    ImageDownload { url: String, reason: String },

    #[error("Invalid Engine configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Engine(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
