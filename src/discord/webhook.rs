use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::discord::{Message, MessageData};

/// Message id addressing the initial response of an interaction.
pub const ORIGINAL_MESSAGE: &str = "@original";

/// Sends and edits messages on an interaction's follow-up webhook.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn execute(&self, application_id: &str, token: &str, payload: &MessageData) -> Result<Message>;

    async fn edit(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
        payload: &MessageData,
    ) -> Result<Message>;
}

/// Follow-up handle scoped to one interaction's `(application_id, token)`.
#[derive(Clone)]
pub struct Webhook {
    transport: Arc<dyn WebhookTransport>,
    application_id: String,
    token: String,
}

impl Webhook {
    pub fn new(transport: Arc<dyn WebhookTransport>, application_id: &str, token: &str) -> Self {
        Self {
            transport,
            application_id: application_id.to_string(),
            token: token.to_string(),
        }
    }

    pub async fn send(&self, payload: &MessageData) -> Result<Message> {
        self.transport
            .execute(&self.application_id, &self.token, payload)
            .await
    }

    pub async fn edit(&self, message_id: &str, payload: &MessageData) -> Result<Message> {
        self.transport
            .edit(&self.application_id, &self.token, message_id, payload)
            .await
    }
}
