//! Error types for the document store

use thiserror::Error;

pub type DocsResult<T> = Result<T, DocsError>;

#[derive(Error, Debug)]
pub enum DocsError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("no document named {0}")]
    NotFound(String),

    #[error("unsupported document {0} (expected .md, .txt or .csv)")]
    Unsupported(String),

    #[error("invalid document name: {0}")]
    InvalidName(String),

    #[error("embedding error: {0}")]
    Embed(#[from] karir_llm::LlmError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
