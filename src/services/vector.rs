use async_trait::async_trait;
use std::sync::Arc;

use crate::core::collaborators::SemanticMatcher;
use crate::core::errors::MatchError;
use crate::models::ServiceMatch;
use crate::services::azure_openai::AzureOpenAIClient;
use crate::services::supabase::SupabaseClient;

/// Semantic matcher backed by an Azure embedding deployment and the Supabase
/// similarity search function
pub struct VectorMatcher {
    embeddings: Arc<AzureOpenAIClient>,
    store: Arc<SupabaseClient>,
}

impl VectorMatcher {
    pub fn new(embeddings: Arc<AzureOpenAIClient>, store: Arc<SupabaseClient>) -> Self {
        Self { embeddings, store }
    }
}

#[async_trait]
impl SemanticMatcher for VectorMatcher {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        self.embeddings.embed(text).await
    }

    async fn match_services(&self, embedding: &[f32], k: usize) -> Result<Vec<ServiceMatch>, MatchError> {
        self.store.match_services(embedding, k).await
    }
}
