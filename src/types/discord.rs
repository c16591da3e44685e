use serde::{Deserialize, Serialize};
use serde_json::Value;

// Interaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    ApplicationCommandAutocomplete = 4,
    ModalSubmit = 5,
    Unknown,
}

impl InteractionType {
    pub fn from_u8(kind: u8) -> Self {
        match kind {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::ApplicationCommandAutocomplete,
            5 => Self::ModalSubmit,
            _ => Self::Unknown,
        }
    }
}

// Application command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    ChatInput = 1,
    User = 2,
    Message = 3,
}

impl CommandType {
    pub fn from_u8(kind: u8) -> Option<Self> {
        match kind {
            1 => Some(Self::ChatInput),
            2 => Some(Self::User),
            3 => Some(Self::Message),
            _ => None,
        }
    }
}

// Message component types routed by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Button,
    SelectMenu,
}

impl ComponentType {
    /// 2 is a button; 3 and 5..=8 are the string, user, role, mentionable and channel selects.
    pub fn from_u8(kind: u8) -> Option<Self> {
        match kind {
            2 => Some(Self::Button),
            3 | 5..=8 => Some(Self::SelectMenu),
            _ => None,
        }
    }
}

// Interaction callback types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
    DeferredUpdateMessage = 6,
    UpdateMessage = 7,
    ApplicationCommandAutocompleteResult = 8,
}

/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub interaction_type: u8,
    pub token: String,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Interaction {
    pub fn kind(&self) -> InteractionType {
        InteractionType::from_u8(self.interaction_type)
    }

    /// The invoking user, whether the interaction came from a guild or a DM.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}

/// Union of the command and component data shapes; unused fields stay empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub command_type: Option<u8>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub component_type: Option<u8>,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub option_type: u8,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub focused: bool,
}

impl CommandOption {
    pub const SUB_COMMAND: u8 = 1;
    pub const SUB_COMMAND_GROUP: u8 = 2;

    /// Subcommands and groups carry their arguments in `options` instead of `value`.
    pub fn is_subcommand(&self) -> bool {
        matches!(self.option_type, Self::SUB_COMMAND | Self::SUB_COMMAND_GROUP)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
}

/// Canonical message payload shared by initial responses and follow-ups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

/// https://discord.com/developers/docs/resources/message#embed-object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteChoice {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Choices { choices: Vec<AutocompleteChoice> },
    Message(MessageData),
}

// Interaction response to Discord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub response_type: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub fn new(response_type: ResponseType, data: Option<ResponseData>) -> Self {
        Self {
            response_type: response_type as u8,
            data,
        }
    }

    pub fn pong() -> Self {
        Self::new(ResponseType::Pong, None)
    }

    pub fn message(response_type: ResponseType, data: MessageData) -> Self {
        Self::new(response_type, Some(ResponseData::Message(data)))
    }

    pub fn choices(choices: Vec<AutocompleteChoice>) -> Self {
        Self::new(
            ResponseType::ApplicationCommandAutocompleteResult,
            Some(ResponseData::Choices { choices }),
        )
    }

    /// The message payload carried by this response, if any.
    pub fn message_data(&self) -> Option<&MessageData> {
        match &self.data {
            Some(ResponseData::Message(data)) => Some(data),
            _ => None,
        }
    }
}

/// Message returned by the webhook endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
}

// Discord API error response
#[derive(Debug, Deserialize)]
pub struct DiscordErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub retry_after: Option<f64>,
    #[serde(default)]
    pub global: Option<bool>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl std::fmt::Display for DiscordErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.unwrap_or(0), self.message)?;

        if let Some(retry) = self.retry_after {
            write!(f, " (retry after {:.3}s)", retry)?;
        }

        if self.global == Some(true) {
            write!(f, " [GLOBAL]")?;
        }

        if let Some(errors) = &self.errors {
            write!(
                f,
                "\nDetails: {}",
                serde_json::to_string_pretty(errors).unwrap_or_default()
            )?;
        }

        Ok(())
    }
}
