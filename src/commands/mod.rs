use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::InteractionContext;
use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::CommandType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    /// Refuse to run outside a guild.
    pub guild_only: bool,
}

impl CommandDefinition {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            guild_only: false,
        }
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }
}

/// Trait for slash, user and message commands
#[async_trait]
pub trait Command: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    /// Drive the context to a response.
    async fn handle(&self, ctx: &mut InteractionContext) -> Result<()>;

    /// Suggest option values while the user types. Only slash commands are asked.
    async fn autocomplete(&self, ctx: &mut InteractionContext) -> Result<()> {
        ctx.respond_choices(Vec::new())
    }
}

/// Commands as declared at startup, by category.
#[derive(Default, Clone)]
pub struct Commands {
    pub slash: Vec<Arc<dyn Command>>,
    pub user: Vec<Arc<dyn Command>>,
    pub message: Vec<Arc<dyn Command>>,
}

pub struct RegisteredCommand {
    pub definition: CommandDefinition,
    pub handler: Arc<dyn Command>,
}

/// Immutable name lookup per command category.
#[derive(Default)]
pub struct CommandRegistry {
    by_type: HashMap<CommandType, HashMap<String, RegisteredCommand>>,
}

impl CommandRegistry {
    pub fn new(commands: Commands) -> Result<Self> {
        let mut by_type = HashMap::new();
        for (kind, list) in [
            (CommandType::ChatInput, commands.slash),
            (CommandType::User, commands.user),
            (CommandType::Message, commands.message),
        ] {
            let mut named = HashMap::with_capacity(list.len());
            for handler in list {
                let definition = handler.definition();
                if named.contains_key(&definition.name) {
                    return Err(BotError::kind(ErrorKind::DuplicateCommand)
                        .push_str(format!("{:?} command `{}`", kind, definition.name)));
                }
                named.insert(definition.name.clone(), RegisteredCommand { definition, handler });
            }
            by_type.insert(kind, named);
        }
        Ok(Self { by_type })
    }

    pub fn get(&self, kind: CommandType, name: &str) -> Option<&RegisteredCommand> {
        self.by_type.get(&kind)?.get(name)
    }

    pub fn definitions(&self, kind: CommandType) -> impl Iterator<Item = &CommandDefinition> {
        self.by_type
            .get(&kind)
            .into_iter()
            .flat_map(|named| named.values().map(|c| &c.definition))
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
