use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{Event, InteractionContext};
use crate::error::Result;
use crate::types::discord::{CommandType, ComponentType, InteractionResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Go on to the registered handler.
    Continue,
    /// Deliver this response and stop.
    Respond(InteractionResponse),
}

/// Runs before handler lookup and may answer the interaction itself.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, ctx: &mut InteractionContext) -> Result<HookOutcome>;
}

/// One optional hook per interaction category.
#[derive(Default, Clone)]
pub struct HookSet {
    pub slash_command: Option<Arc<dyn Hook>>,
    pub autocomplete: Option<Arc<dyn Hook>>,
    pub user_command: Option<Arc<dyn Hook>>,
    pub message_command: Option<Arc<dyn Hook>>,
    pub button: Option<Arc<dyn Hook>>,
    pub select_menu: Option<Arc<dyn Hook>>,
}

impl HookSet {
    pub fn for_event(&self, event: &Event) -> Option<&Arc<dyn Hook>> {
        match event {
            Event::Command(command) => match command.kind {
                CommandType::ChatInput => self.slash_command.as_ref(),
                CommandType::User => self.user_command.as_ref(),
                CommandType::Message => self.message_command.as_ref(),
            },
            Event::Autocomplete(_) => self.autocomplete.as_ref(),
            Event::Component(component) => match component.kind {
                ComponentType::Button => self.button.as_ref(),
                ComponentType::SelectMenu => self.select_menu.as_ref(),
            },
        }
    }
}
