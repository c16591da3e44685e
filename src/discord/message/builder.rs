use serde_json::Value;

use crate::types::discord::{Embed, EmbedField, MessageData};

pub const ERROR_COLOR: u32 = 0xED4245;
const EPHEMERAL: u64 = 1 << 6;

/// Builds the canonical message payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBuilder {
    data: MessageData,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.data.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: EmbedBuilder) -> Self {
        self.data.embeds.push(embed.build());
        self
    }

    /// Append a raw action row.
    pub fn component_row(mut self, row: Value) -> Self {
        self.data.components.push(row);
        self
    }

    /// Only the invoking user sees the message.
    pub fn ephemeral(mut self) -> Self {
        self.data.flags = Some(self.data.flags.unwrap_or(0) | EPHEMERAL);
        self
    }

    pub fn build(self) -> MessageData {
        self.data
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedBuilder {
    embed: Embed,
}

impl EmbedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.embed.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.embed.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.embed.url = Some(url.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.embed.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.embed.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn build(self) -> Embed {
        self.embed
    }
}

/// A message made of one embed whose description is `text`.
pub fn simple_embed(text: &str) -> MessageBuilder {
    MessageBuilder::new().embed(EmbedBuilder::new().description(text))
}

pub fn simple_error(text: &str, title: Option<&str>) -> MessageBuilder {
    MessageBuilder::new().embed(
        EmbedBuilder::new()
            .title(title.unwrap_or("Error"))
            .description(text)
            .color(ERROR_COLOR),
    )
}
