// Error types surfaced by the application services
use thiserror::Error;

/// Raised to the caller of an aggregation. Upstream failures never appear
/// here; they are folded into the response instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Latitude and Longitude are required fields.")]
    InvalidArgument,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Well-formed reply that lacks the expected fields.
    #[error("{0}")]
    Format(String),
    /// Transport failure, timeout, non-success status or undecodable body.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No message provided")]
    EmptyMessage,
    #[error("Chat not found")]
    NotFound,
    #[error("Unauthorized access")]
    Forbidden,
    #[error("{0}")]
    Generation(#[source] anyhow::Error),
    #[error("{0}")]
    Storage(#[source] anyhow::Error),
}
