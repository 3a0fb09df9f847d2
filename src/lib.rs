use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("Could not load {}. Make sure the file exists and is not empty.", .0.display())]
    MissingDocument(PathBuf),

    #[error("Could not load {}. Make sure the file exists and is not empty.", .0.display())]
    EmptyDocumentSet(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index build error: {0}")]
    IndexBuild(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl QaError {
    /// Errors that end the program before the session starts but are not
    /// treated as a failed run.
    #[inline]
    pub fn is_missing_source(&self) -> bool {
        matches!(self, Self::MissingDocument(_) | Self::EmptyDocumentSet(_))
    }

    /// Errors scoped to a single question. The session reports them and keeps
    /// reading input.
    #[inline]
    pub fn is_per_query(&self) -> bool {
        matches!(
            self,
            Self::Embedding(_) | Self::Retrieval(_) | Self::Generation(_)
        )
    }
}

impl From<config::ConfigError> for QaError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub mod commands;
pub mod config;
pub mod database;
pub mod document;
pub mod embeddings;
pub mod generation;
pub mod pipeline;
pub mod prompt;
pub mod session;
