//! Narrow interfaces to the external services the pipeline depends on.
//!
//! Production implementations live in [`crate::services`]; tests swap in
//! in-memory doubles.

use async_trait::async_trait;

use crate::core::errors::{CompletionError, DeliveryError, MatchError, StoreError};
use crate::models::{ClinicInfo, DeliveryResult, ServiceMatch};

/// Source of the single clinic record
#[async_trait]
pub trait ClinicInfoStore: Send + Sync {
    /// Fetch the clinic record.
    ///
    /// An empty store yields [`ClinicInfo::placeholder`], not an error.
    async fn fetch_clinic_info(&self) -> Result<ClinicInfo, StoreError>;
}

/// Embedding plus similarity search over clinic services
#[async_trait]
pub trait SemanticMatcher: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError>;

    /// Top `k` services for `embedding`, sorted by descending similarity.
    /// No rows is an empty list.
    async fn match_services(&self, embedding: &[f32], k: usize) -> Result<Vec<ServiceMatch>, MatchError>;
}

/// One chat-completion call
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Hosted chat model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the text of the first choice. Empty when the provider sent no content.
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, CompletionError>;
}

/// Outbound messaging channel
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Send `text` to `recipient`.
    ///
    /// A response from the provider is `Ok` whatever its status; `success` is set only
    /// for HTTP 200. Transport failures are `Err`.
    async fn send(&self, recipient: &str, text: &str) -> Result<DeliveryResult, DeliveryError>;
}
