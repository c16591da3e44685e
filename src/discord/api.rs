use async_trait::async_trait;
use reqwest::{Client, Method, Response};

use crate::discord::webhook::WebhookTransport;
use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::*;

pub const API_BASE: &str = "https://discord.com/api/v10";

/// Webhook transport over the Discord REST API. Interaction webhooks are
/// authenticated by the interaction token in the path, so no bot token is sent.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new(Client::new(), API_BASE)
    }
}

impl RestClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(&self, method: Method, route: String, payload: &MessageData) -> Result<Message> {
        let response = self
            .client
            .request(method.clone(), format!("{}{}", self.base_url, route))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let response = check_status(response, &method, &redact_token(&route)).await?;
        let message: Message = response.json().await?;
        Ok(message)
    }
}

#[async_trait]
impl WebhookTransport for RestClient {
    async fn execute(&self, application_id: &str, token: &str, payload: &MessageData) -> Result<Message> {
        let route = format!("/webhooks/{}/{}?wait=true", application_id, token);
        self.send(Method::POST, route, payload).await
    }

    async fn edit(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
        payload: &MessageData,
    ) -> Result<Message> {
        let route = format!("/webhooks/{}/{}/messages/{}", application_id, token, message_id);
        self.send(Method::PATCH, route, payload).await
    }
}

async fn check_status(response: Response, method: &Method, route: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();

    if let Ok(discord_err) = serde_json::from_str::<DiscordErrorResponse>(&error_text) {
        return Err(BotError::kind(ErrorKind::DiscordApiError)
            .push_str(format!("{} {}: {}", method, route, discord_err)));
    }

    Err(BotError::kind(ErrorKind::HttpError)
        .push_str(format!("{} {}: {} - {}", method, route, status, error_text)))
}

// Interaction tokens are credentials; keep them out of error trees.
fn redact_token(route: &str) -> String {
    let mut segments: Vec<&str> = route.split('/').collect();
    if segments.get(1) == Some(&"webhooks") && segments.len() > 3 {
        segments[3] = "<token>";
    }
    segments.join("/")
}
