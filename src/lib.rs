use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Not a valid PDF: {0}")]
    InvalidPdf(String),

    #[error("Index '{index}' stores {existing}-dimensional vectors, but {requested} were requested")]
    DimensionMismatch {
        index: String,
        existing: usize,
        requested: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod database;
pub mod documents;
pub mod embeddings;
pub mod generation;
pub mod http;
pub mod memory;
pub mod prompt;
pub mod rag;
#[cfg(test)]
mod test_support;
pub mod web;
