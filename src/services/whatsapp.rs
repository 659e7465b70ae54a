use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::core::collaborators::MessageDispatcher;
use crate::core::errors::DeliveryError;
use crate::models::DeliveryResult;

/// WhatsApp Cloud API client for plain text messages
pub struct WhatsAppClient {
    api_base: String,
    api_version: String,
    phone_number_id: String,
    token: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody<'a>,
}

impl WhatsAppClient {
    pub fn new(
        api_base: String,
        api_version: String,
        phone_number_id: String,
        token: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            api_base,
            api_version,
            phone_number_id,
            token,
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.api_version,
            self.phone_number_id
        )
    }

    /// Send a text message.
    ///
    /// Only HTTP 200 counts as delivered. Other statuses, other 2xx codes included,
    /// come back as `success: false`.
    pub async fn send_text(&self, to: &str, text: &str) -> Result<DeliveryResult, DeliveryError> {
        let payload = TextMessage {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextBody { body: text },
        };

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let success = status == StatusCode::OK;

        if !success {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::warn!("WhatsApp send to {} returned {}: {}", to, status, body);
        } else {
            tracing::debug!("WhatsApp message delivered to {}", to);
        }

        Ok(DeliveryResult {
            success,
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl MessageDispatcher for WhatsAppClient {
    async fn send(&self, recipient: &str, text: &str) -> Result<DeliveryResult, DeliveryError> {
        self.send_text(recipient, text).await
    }
}
