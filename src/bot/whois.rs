use async_trait::async_trait;
use discord_interactions::discord::message::{EmbedBuilder, MessageBuilder};
use discord_interactions::{Command, CommandDefinition, InteractionContext, Result};

/// User context-menu command; defers, then fills in the answer by editing.
pub struct Whois;

#[async_trait]
impl Command for Whois {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("whois", "").guild_only()
    }

    async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
        ctx.defer()?;

        let target = ctx
            .command()
            .and_then(|c| c.target_id.clone())
            .unwrap_or_default();
        let asked_by = ctx.user().map(|u| u.id.clone()).unwrap_or_default();

        ctx.edit_message(
            MessageBuilder::new().embed(
                EmbedBuilder::new()
                    .title("Who is this?")
                    .field("User", format!("<@{}>", target), true)
                    .field("Asked by", format!("<@{}>", asked_by), true),
            ),
        )
        .await?;
        Ok(())
    }
}
