use crate::components::parse_custom_id;
use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::{
    CommandOption, CommandType, ComponentType, Interaction, InteractionData, InteractionType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CommandEvent {
    pub kind: CommandType,
    pub name: String,
    pub options: Vec<CommandOption>,
    /// User or message a context-menu command was invoked on.
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentEvent {
    pub kind: ComponentType,
    /// Handler key: the first segment of the custom id.
    pub id: String,
    pub args: Vec<String>,
    /// Selected values; always empty for buttons.
    pub values: Vec<String>,
}

/// What a routed interaction is about.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command(CommandEvent),
    Autocomplete(CommandEvent),
    Component(ComponentEvent),
}

impl Event {
    /// Classify a non-ping interaction. Modal submits and unknown types are unsupported.
    pub fn classify(interaction: &Interaction) -> Result<Self> {
        match interaction.kind() {
            InteractionType::ApplicationCommand => {
                Ok(Self::Command(command_event(interaction.data.as_ref())?))
            }
            InteractionType::ApplicationCommandAutocomplete => {
                let event = command_event(interaction.data.as_ref())?;
                if event.kind != CommandType::ChatInput {
                    return Err(BotError::kind(ErrorKind::UnsupportedInteraction)
                        .push_str(format!("autocomplete for {:?} command", event.kind)));
                }
                Ok(Self::Autocomplete(event))
            }
            InteractionType::MessageComponent => {
                Ok(Self::Component(component_event(interaction.data.as_ref())?))
            }
            other => Err(BotError::kind(ErrorKind::UnsupportedInteraction)
                .push_str(format!("interaction type {} ({:?})", interaction.interaction_type, other))),
        }
    }
}

fn missing(field: &str) -> BotError {
    BotError::kind(ErrorKind::MalformedInteraction).push_str(format!("missing data.{}", field))
}

fn command_event(data: Option<&InteractionData>) -> Result<CommandEvent> {
    let data = data.ok_or_else(|| missing("*"))?;
    let name = data.name.clone().ok_or_else(|| missing("name"))?;
    // missing type means chat input
    let raw_kind = data.command_type.unwrap_or(CommandType::ChatInput as u8);
    let kind = CommandType::from_u8(raw_kind).ok_or_else(|| {
        BotError::kind(ErrorKind::UnsupportedInteraction)
            .push_str(format!("command type {}", raw_kind))
    })?;

    Ok(CommandEvent {
        kind,
        name,
        options: data.options.clone(),
        target_id: data.target_id.clone(),
    })
}

fn component_event(data: Option<&InteractionData>) -> Result<ComponentEvent> {
    let data = data.ok_or_else(|| missing("*"))?;
    let raw_kind = data.component_type.ok_or_else(|| missing("component_type"))?;
    let kind = ComponentType::from_u8(raw_kind).ok_or_else(|| {
        BotError::kind(ErrorKind::UnsupportedInteraction)
            .push_str(format!("component type {}", raw_kind))
    })?;
    let custom_id = data.custom_id.as_deref().ok_or_else(|| missing("custom_id"))?;
    let (id, args) = parse_custom_id(custom_id)?;

    Ok(ComponentEvent {
        kind,
        id,
        args,
        values: match kind {
            ComponentType::SelectMenu => data.values.clone(),
            ComponentType::Button => Vec::new(),
        },
    })
}
