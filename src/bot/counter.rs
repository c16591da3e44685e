use async_trait::async_trait;
use discord_interactions::discord::message::MessageBuilder;
use discord_interactions::{
    Command, CommandDefinition, Component, ComponentDefinition, InteractionContext, Result, custom_id,
};
use serde_json::json;

const ID: &str = "counter";

fn counter_message(count: u64) -> MessageBuilder {
    MessageBuilder::new()
        .content(format!("The raft has been rowed {} times.", count))
        .component_row(json!({
            "type": 1,
            "components": [{
                "type": 2,
                "style": 1,
                "label": "Row",
                "custom_id": custom_id(ID, &[count.to_string()]),
            }]
        }))
}

/// `/counter` posts a message with a button that counts its clicks.
pub struct Counter;

#[async_trait]
impl Command for Counter {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new(ID, "Start a click counter")
    }

    async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
        ctx.reply(counter_message(0))
    }
}

pub struct CounterButton;

#[async_trait]
impl Component for CounterButton {
    fn definition(&self) -> ComponentDefinition {
        ComponentDefinition::button(ID)
    }

    async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
        let count = ctx
            .args()
            .first()
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0);
        ctx.reply(counter_message(count + 1))
    }
}
