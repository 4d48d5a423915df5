//! Error types for job sources and pipelines

use thiserror::Error;

pub type JobsResult<T> = Result<T, JobsError>;

#[derive(Error, Debug)]
pub enum JobsError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("llm error: {0}")]
    Llm(#[from] karir_llm::LlmError),

    #[error(transparent)]
    Core(#[from] karir_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl JobsError {
    pub fn status(status: reqwest::StatusCode, url: impl Into<String>) -> Self {
        Self::Status { status: status.as_u16(), url: url.into() }
    }
}
