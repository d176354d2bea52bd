use std::path::PathBuf;

use crate::engine::EngineError;

/// Errors produced while judging mutants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Please provide a value for \"{name}\" argument.")]
    MissingArgumentValue { name: String },

    #[error("invalid analyzer configuration: {0}")]
    Config(String),

    #[error("failed to parse analyzer configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid mutant record for {path}: {reason}")]
    InvalidRecord { path: PathBuf, reason: String },

    #[error("static analysis failed: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
