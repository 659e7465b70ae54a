use std::sync::Arc;

use crate::core::collaborators::{ChatModel, ChatRequest};
use crate::core::errors::CompletionError;
use crate::core::prompt::{build_user_message, format_context, NOT_FOUND_REPLY, SYSTEM_PROMPT};
use crate::models::{ClinicInfo, ComposedAnswer, ServiceMatch};

/// Generation parameters for the chat model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Currency label appended to service prices
    pub currency: String,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            currency: "tenge".to_string(),
        }
    }
}

/// Formats retrieved context into a prompt and asks the chat model for an answer
#[derive(Clone)]
pub struct ResponseComposer {
    model: Arc<dyn ChatModel>,
    options: CompletionOptions,
}

impl ResponseComposer {
    pub fn new(model: Arc<dyn ChatModel>, options: CompletionOptions) -> Self {
        Self { model, options }
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Compose an answer to `query` from the clinic record and service matches.
    ///
    /// An empty completion is replaced by [`NOT_FOUND_REPLY`], so the result is never empty.
    pub async fn compose(
        &self,
        query: &str,
        matches: &[ServiceMatch],
        clinic_info: &ClinicInfo,
    ) -> Result<ComposedAnswer, CompletionError> {
        let context = format_context(matches, clinic_info, &self.options.currency);
        let user = build_user_message(&context, query);

        let text = self
            .model
            .complete(ChatRequest {
                system: SYSTEM_PROMPT,
                user: &user,
                temperature: self.options.temperature,
                max_tokens: self.options.max_tokens,
            })
            .await?;

        let text = text.trim();
        if text.is_empty() {
            tracing::warn!("Chat model returned an empty completion, using fallback answer");
            return Ok(ComposedAnswer {
                text: NOT_FOUND_REPLY.to_string(),
            });
        }

        Ok(ComposedAnswer {
            text: text.to_string(),
        })
    }
}
