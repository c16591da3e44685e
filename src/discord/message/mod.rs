mod builder;

pub use builder::{ERROR_COLOR, EmbedBuilder, MessageBuilder, simple_embed, simple_error};

use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::{InteractionResponse, MessageData, ResponseType};

/// Anything a handler may reply or follow up with.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageInput {
    /// Shown as a single simple embed.
    Text(String),
    Builder(MessageBuilder),
    /// Pre-built response, delivered as is.
    Raw(InteractionResponse),
}

impl MessageInput {
    /// The initial response for this message, using `response_type` unless it is already raw.
    pub fn into_response(self, response_type: ResponseType) -> InteractionResponse {
        match self {
            Self::Text(text) => InteractionResponse::message(response_type, simple_embed(&text).build()),
            Self::Builder(builder) => InteractionResponse::message(response_type, builder.build()),
            Self::Raw(response) => response,
        }
    }

    /// The message payload for follow-up sends and edits. A raw response
    /// without message data has nothing to post.
    pub fn into_payload(self) -> Result<MessageData> {
        match self {
            Self::Text(text) => Ok(simple_embed(&text).build()),
            Self::Builder(builder) => Ok(builder.build()),
            Self::Raw(response) => response.message_data().cloned().ok_or_else(|| {
                BotError::kind(ErrorKind::InvalidResponseType)
                    .push_str(format!("response type {} carries no message", response.response_type))
            }),
        }
    }
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<MessageBuilder> for MessageInput {
    fn from(builder: MessageBuilder) -> Self {
        Self::Builder(builder)
    }
}

impl From<InteractionResponse> for MessageInput {
    fn from(response: InteractionResponse) -> Self {
        Self::Raw(response)
    }
}
