use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a question about Indian defence.";
pub const OUT_OF_SCOPE_MESSAGE: &str =
    "Sorry, I can only answer questions related to Indian defence.";
pub const NO_RESULTS_MESSAGE: &str = "No Google search results found.";
pub const NO_USEFUL_INFORMATION_MESSAGE: &str = "No useful information found for this query.";
pub const NOT_ENOUGH_CONTEXT_MESSAGE: &str = "Not enough context to generate a summary.";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("expected {expected} embeddings, got {got}")]
    Count { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Rendered as `<status>: <body>` so the raw downstream body reaches the client.
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyQuery,
    OutOfScope,
    Search,
    NoResults,
    NoUsefulInformation,
    NotEnoughContext,
    Embedding,
    Summarize,
    Internal,
}

/// Every way a request can fail. `Display` yields the text that is put in the
/// `response` field.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{}", EMPTY_QUERY_MESSAGE)]
    EmptyQuery,
    #[error("{}", OUT_OF_SCOPE_MESSAGE)]
    OutOfScope,
    #[error("[Google error] {0}")]
    Search(#[from] SearchError),
    #[error("{}", NO_RESULTS_MESSAGE)]
    NoResults,
    #[error("{}", NO_USEFUL_INFORMATION_MESSAGE)]
    NoUsefulInformation,
    #[error("{}", NOT_ENOUGH_CONTEXT_MESSAGE)]
    NotEnoughContext,
    #[error("[Embedding error] {0}")]
    Embedding(#[from] EmbedError),
    #[error("[Summarizer error] {0}")]
    Summarize(#[from] SummarizeError),
    #[error("[Server Error] {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::EmptyQuery => ErrorKind::EmptyQuery,
            PipelineError::OutOfScope => ErrorKind::OutOfScope,
            PipelineError::Search(_) => ErrorKind::Search,
            PipelineError::NoResults => ErrorKind::NoResults,
            PipelineError::NoUsefulInformation => ErrorKind::NoUsefulInformation,
            PipelineError::NotEnoughContext => ErrorKind::NotEnoughContext,
            PipelineError::Embedding(_) => ErrorKind::Embedding,
            PipelineError::Summarize(_) => ErrorKind::Summarize,
            PipelineError::Internal(_) => ErrorKind::Internal,
        }
    }
}
