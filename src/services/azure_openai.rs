use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::collaborators::{ChatModel, ChatRequest};
use crate::core::errors::{CompletionError, MatchError};

/// One Azure OpenAI deployment
#[derive(Debug, Clone)]
pub struct AzureDeployment {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
}

/// Azure OpenAI client bound to a single deployment
///
/// The same type serves the embedding deployment and the chat deployment.
pub struct AzureOpenAIClient {
    deployment: AzureDeployment,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl AzureOpenAIClient {
    pub fn new(deployment: AzureDeployment) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { deployment, client })
    }

    fn operation_url(&self, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.deployment.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.deployment.deployment),
            operation,
            urlencoding::encode(&self.deployment.api_version)
        )
    }

    /// Embed `text` with the deployment's embedding model
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        let response = self
            .client
            .post(self.operation_url("embeddings"))
            .header("api-key", &self.deployment.api_key)
            .json(&EmbeddingRequest { input: text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(MatchError::EmbeddingApi { status, body });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| MatchError::InvalidResponse(format!("Failed to parse embedding: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| MatchError::InvalidResponse("Embedding response has no data".into()))?;

        tracing::trace!("Embedded {} chars into {} dimensions", text.len(), embedding.len());

        Ok(embedding)
    }

    /// Run a chat completion with a system and a user message
    pub async fn chat(&self, request: ChatRequest<'_>) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.operation_url("chat/completions"))
            .header("api-key", &self.deployment.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(CompletionError::ApiError { status, body });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(format!("Failed to parse completion: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::InvalidResponse("Completion has no choices".into()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl ChatModel for AzureOpenAIClient {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, CompletionError> {
        self.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_url() {
        let client = AzureOpenAIClient::new(AzureDeployment {
            endpoint: "https://clinic.openai.azure.com/".to_string(),
            api_key: "key".to_string(),
            api_version: "2024-02-01".to_string(),
            deployment: "text-embedding-3-small".to_string(),
        })
        .unwrap();

        assert_eq!(
            client.operation_url("embeddings"),
            "https://clinic.openai.azure.com/openai/deployments/text-embedding-3-small/embeddings?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_chat_response_null_content() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert_eq!(parsed.choices[0].message.content, None);
    }
}
