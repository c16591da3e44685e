use async_trait::async_trait;
use discord_interactions::{Command, CommandDefinition, InteractionContext, Result};

pub struct Ahoy;

#[async_trait]
impl Command for Ahoy {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("ahoy", "A pirate greeting")
    }

    async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
        ctx.reply("Aye aye, Captain! Raft's afloat!")
    }
}
