//! Error types for Karir

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("likert score must be between 1 and 5, got {0}")]
    InvalidLikert(u8),

    #[error("unknown RIASEC type: {0}")]
    UnknownType(String),

    #[error("question {0} has no answer")]
    IncompleteAnswers(usize),

    #[error("question index out of range: {0}")]
    UnknownQuestion(usize),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
