use std::time::Duration;
use thiserror::Error;

/// Errors from the clinic-info store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Errors from embedding or similarity search
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("embedding provider returned {status}: {body}")]
    EmbeddingApi { status: u16, body: String },

    #[error("similarity search returned {status}: {body}")]
    SearchApi { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Errors from the chat-completion provider
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("completion provider returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Errors from outbound message delivery
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("messaging provider rejected the message with status {0}")]
    Rejected(u16),
}

/// Request-scoped failure of the query pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("clinic info lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("service matching failed: {0}")]
    Match(#[from] MatchError),

    #[error("response composition failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("message delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("{stage} timed out after {}s", .timeout.as_secs_f64())]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },
}

impl PipelineError {
    /// Stable error code exposed to HTTP callers
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Store(_) => "clinic_store_error",
            PipelineError::Match(_) => "service_match_error",
            PipelineError::Completion(_) => "completion_error",
            PipelineError::Delivery(_) => "delivery_error",
            PipelineError::Timeout { .. } => "upstream_timeout",
        }
    }

    /// HTTP status for this failure. All of them are upstream failures.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::Timeout { .. } => 504,
            _ => 502,
        }
    }
}
