//! Per-interaction state and the response lifecycle.
//!
//! A context starts `Fresh` and becomes `Acknowledged` after exactly one
//! `defer`, `reply` or `respond_choices`. Independently, its token is live for
//! [`TOKEN_VALIDITY`] after receipt; follow-ups are refused once it expires.

mod event;
mod responder;

pub use event::{CommandEvent, ComponentEvent, Event};
pub use responder::Responder;

use tokio::time::{Duration, Instant};

use crate::discord::message::MessageInput;
use crate::discord::webhook::{ORIGINAL_MESSAGE, Webhook};
use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::{
    AutocompleteChoice, CommandOption, Interaction, InteractionResponse, Message, ResponseType, User,
};

/// How long an interaction token authorizes follow-ups.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(15 * 60);

pub struct InteractionContext {
    interaction: Interaction,
    event: Event,
    responder: Responder,
    webhook: Webhook,
    received_at: Instant,
    replied: bool,
}

impl InteractionContext {
    pub fn new(
        interaction: Interaction,
        event: Event,
        responder: Responder,
        webhook: Webhook,
        received_at: Instant,
    ) -> Self {
        Self {
            interaction,
            event,
            responder,
            webhook,
            received_at,
            replied: false,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Command data for command and autocomplete interactions.
    pub fn command(&self) -> Option<&CommandEvent> {
        match &self.event {
            Event::Command(command) | Event::Autocomplete(command) => Some(command),
            Event::Component(_) => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentEvent> {
        match &self.event {
            Event::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Command name, or component id.
    pub fn name(&self) -> &str {
        match &self.event {
            Event::Command(command) | Event::Autocomplete(command) => &command.name,
            Event::Component(component) => &component.id,
        }
    }

    pub fn args(&self) -> &[String] {
        self.component().map(|c| c.args.as_slice()).unwrap_or_default()
    }

    pub fn values(&self) -> &[String] {
        self.component().map(|c| c.values.as_slice()).unwrap_or_default()
    }

    /// Argument `name`, looked up inside the invoked subcommand if there is one.
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        find_argument(&self.command()?.options, &|o| o.name == name)
    }

    /// The option the user is typing into, for autocomplete.
    pub fn focused_option(&self) -> Option<&CommandOption> {
        find_argument(&self.command()?.options, &|o| o.focused)
    }

    pub fn user(&self) -> Option<&User> {
        self.interaction.invoker()
    }

    pub fn is_dm(&self) -> bool {
        self.interaction.guild_id.is_none()
    }

    pub fn replied(&self) -> bool {
        self.replied
    }

    /// Whether the token validity window has passed. Never reverts to `false`.
    pub fn expired(&self) -> bool {
        self.received_at.elapsed() >= TOKEN_VALIDITY
    }

    /// Acknowledge now and respond later through follow-ups.
    pub fn defer(&mut self) -> Result<()> {
        self.ensure_fresh()?;
        let (deferred, _) = self.acknowledgment_types()?;
        self.deliver(InteractionResponse::new(deferred, None))
    }

    /// Send the initial response: a new message for commands, an update of the
    /// originating message for components.
    pub fn reply(&mut self, message: impl Into<MessageInput>) -> Result<()> {
        self.ensure_fresh()?;
        let (_, immediate) = self.acknowledgment_types()?;
        let response = message.into().into_response(immediate);
        self.deliver(response)
    }

    /// Answer an autocomplete interaction.
    pub fn respond_choices(&mut self, choices: Vec<AutocompleteChoice>) -> Result<()> {
        self.ensure_fresh()?;
        if !matches!(self.event, Event::Autocomplete(_)) {
            return Err(BotError::kind(ErrorKind::InvalidResponseType)
                .push_str("choices are only valid for autocomplete"));
        }
        self.deliver(InteractionResponse::choices(choices))
    }

    pub(crate) fn raw_reply(&mut self, response: InteractionResponse) -> Result<()> {
        self.ensure_fresh()?;
        self.deliver(response)
    }

    /// Edit the initial response.
    pub async fn edit_message(&self, message: impl Into<MessageInput>) -> Result<Message> {
        self.edit_message_by_id(ORIGINAL_MESSAGE, message).await
    }

    pub async fn edit_message_by_id(&self, message_id: &str, message: impl Into<MessageInput>) -> Result<Message> {
        self.ensure_live()?;
        let payload = message.into().into_payload()?;
        self.webhook.edit(message_id, &payload).await
    }

    /// Post a new follow-up message.
    pub async fn send_message(&self, message: impl Into<MessageInput>) -> Result<Message> {
        self.ensure_live()?;
        let payload = message.into().into_payload()?;
        self.webhook.send(&payload).await
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.replied || self.responder.is_spent() {
            return Err(BotError::kind(ErrorKind::ResponseAlreadySent)
                .push_str(format!("interaction {}", self.interaction.id)));
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.expired() {
            return Err(BotError::kind(ErrorKind::TokenExpired)
                .push_str(format!("interaction {}", self.interaction.id)));
        }
        Ok(())
    }

    /// (deferred, immediate) response types for this interaction.
    fn acknowledgment_types(&self) -> Result<(ResponseType, ResponseType)> {
        match self.event {
            Event::Command(_) => Ok((
                ResponseType::DeferredChannelMessageWithSource,
                ResponseType::ChannelMessageWithSource,
            )),
            Event::Component(_) => Ok((ResponseType::DeferredUpdateMessage, ResponseType::UpdateMessage)),
            Event::Autocomplete(_) => Err(BotError::kind(ErrorKind::InvalidResponseType)
                .push_str("autocomplete accepts only choices")),
        }
    }

    fn deliver(&mut self, response: InteractionResponse) -> Result<()> {
        self.replied = true;
        let result = self.responder.deliver(response);
        if matches!(&result, Err(e) if e.is(ErrorKind::ResponseUndelivered)) {
            tracing::warn!(
                interaction_id = %self.interaction.id,
                "initial response arrived after the transport stopped waiting"
            );
        }
        result
    }
}

fn find_argument<'a>(
    options: &'a [CommandOption],
    wanted: &dyn Fn(&CommandOption) -> bool,
) -> Option<&'a CommandOption> {
    options.iter().find_map(|option| {
        if option.is_subcommand() {
            find_argument(&option.options, wanted)
        } else if wanted(option) {
            Some(option)
        } else {
            None
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::sync::oneshot;

    use super::*;
    use crate::discord::message::{EmbedBuilder, MessageBuilder, simple_embed};
    use crate::discord::webhook::testing::{Call, RecordingTransport};
    use crate::types::discord::ResponseData;

    pub(crate) fn interaction(value: serde_json::Value) -> Interaction {
        serde_json::from_value(value).unwrap()
    }

    pub(crate) fn slash(name: &str, guild: bool) -> Interaction {
        let mut value = json!({
            "id": "100", "application_id": "42", "type": 2, "token": "tok",
            "data": { "name": name, "type": 1 }
        });
        if guild {
            value["guild_id"] = json!("900");
        }
        interaction(value)
    }

    pub(crate) fn button(custom_id: &str) -> Interaction {
        interaction(json!({
            "id": "101", "application_id": "42", "type": 3, "token": "tok", "guild_id": "900",
            "data": { "custom_id": custom_id, "component_type": 2 }
        }))
    }

    fn context(
        interaction: Interaction,
        transport: Arc<RecordingTransport>,
    ) -> (InteractionContext, oneshot::Receiver<InteractionResponse>) {
        let event = Event::classify(&interaction).unwrap();
        let (responder, rx) = Responder::channel();
        let webhook = Webhook::new(transport, &interaction.application_id, &interaction.token);
        (
            InteractionContext::new(interaction, event, responder, webhook, Instant::now()),
            rx,
        )
    }

    #[tokio::test]
    async fn reply_after_defer_is_rejected() {
        let (mut ctx, mut rx) = context(slash("ahoy", true), Arc::default());
        ctx.defer().unwrap();
        assert!(ctx.replied());

        let err = ctx.reply("too late").unwrap_err();
        assert!(err.is(ErrorKind::ResponseAlreadySent));
        assert_eq!(rx.try_recv().unwrap(), InteractionResponse::new(ResponseType::DeferredChannelMessageWithSource, None));
    }

    #[tokio::test]
    async fn defer_after_reply_is_rejected() {
        let (mut ctx, mut rx) = context(slash("ahoy", true), Arc::default());
        ctx.reply("first").unwrap();
        assert!(ctx.defer().unwrap_err().is(ErrorKind::ResponseAlreadySent));

        let delivered = rx.try_recv().unwrap();
        assert_eq!(
            delivered,
            InteractionResponse::message(ResponseType::ChannelMessageWithSource, simple_embed("first").build())
        );
    }

    #[tokio::test]
    async fn component_acknowledges_by_updating() {
        let (mut ctx, mut rx) = context(button("buy|123|gold"), Arc::default());
        assert_eq!(ctx.name(), "buy");
        assert_eq!(ctx.args(), ["123", "gold"]);

        ctx.reply(MessageBuilder::new().content("bought")).unwrap();
        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.response_type, ResponseType::UpdateMessage as u8);
        assert_eq!(delivered.message_data().unwrap().content.as_deref(), Some("bought"));
    }

    #[tokio::test]
    async fn component_defers_as_update() {
        let (mut ctx, mut rx) = context(button("buy"), Arc::default());
        ctx.defer().unwrap();
        assert_eq!(rx.try_recv().unwrap().response_type, ResponseType::DeferredUpdateMessage as u8);
    }

    #[tokio::test]
    async fn autocomplete_only_takes_choices() {
        let autocomplete = interaction(json!({
            "id": "1", "application_id": "42", "type": 4, "token": "tok",
            "data": { "name": "shop", "type": 1, "options": [{ "name": "item", "type": 3, "value": "go", "focused": true }] }
        }));
        let (mut ctx, mut rx) = context(autocomplete, Arc::default());
        assert_eq!(ctx.focused_option().map(|o| o.name.as_str()), Some("item"));
        assert!(ctx.reply("nope").unwrap_err().is(ErrorKind::InvalidResponseType));
        assert!(!ctx.replied());

        let choices = vec![AutocompleteChoice { name: "gold".into(), value: json!("gold") }];
        ctx.respond_choices(choices.clone()).unwrap();
        assert_eq!(rx.try_recv().unwrap().data, Some(ResponseData::Choices { choices }));
    }

    #[tokio::test]
    async fn focused_option_is_found_inside_subcommand_group() {
        let autocomplete = interaction(json!({
            "id": "1", "application_id": "42", "type": 4, "token": "tok",
            "data": { "name": "shop", "type": 1, "options": [{
                "name": "market", "type": 2, "options": [{
                    "name": "buy", "type": 1, "options": [
                        { "name": "amount", "type": 4, "value": 3 },
                        { "name": "item", "type": 3, "value": "go", "focused": true }
                    ]
                }]
            }] }
        }));
        let (ctx, _rx) = context(autocomplete, Arc::default());

        let focused = ctx.focused_option().unwrap();
        assert_eq!(focused.name, "item");
        assert_eq!(focused.value, Some(json!("go")));
        assert_eq!(ctx.option("amount").and_then(|o| o.value.clone()), Some(json!(3)));
        assert!(ctx.option("buy").is_none());
    }

    #[tokio::test]
    async fn raw_follow_up_without_message_is_refused() {
        let transport = Arc::new(RecordingTransport::default());
        let (ctx, _rx) = context(slash("ahoy", true), transport.clone());

        let deferred = InteractionResponse::new(ResponseType::DeferredChannelMessageWithSource, None);
        let err = ctx.send_message(deferred.clone()).await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidResponseType));
        assert!(ctx.edit_message(deferred).await.unwrap_err().is(ErrorKind::InvalidResponseType));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn choices_are_refused_outside_autocomplete() {
        let (mut ctx, _rx) = context(slash("ahoy", true), Arc::default());
        assert!(ctx.respond_choices(Vec::new()).unwrap_err().is(ErrorKind::InvalidResponseType));
    }

    #[tokio::test(start_paused = true)]
    async fn follow_ups_succeed_inside_window() {
        let transport = Arc::new(RecordingTransport::default());
        let (mut ctx, _rx) = context(slash("ahoy", true), transport.clone());
        ctx.defer().unwrap();

        tokio::time::advance(TOKEN_VALIDITY - Duration::from_secs(1)).await;
        assert!(!ctx.expired());

        ctx.edit_message("edited").await.unwrap();
        ctx.send_message(MessageBuilder::new().embed(EmbedBuilder::new().description("sent")))
            .await
            .unwrap();

        assert_eq!(
            transport.calls(),
            vec![
                Call::Edit {
                    application_id: "42".into(),
                    token: "tok".into(),
                    message_id: ORIGINAL_MESSAGE.into(),
                    payload: simple_embed("edited").build(),
                },
                Call::Execute {
                    application_id: "42".into(),
                    token: "tok".into(),
                    payload: simple_embed("sent").build(),
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn follow_ups_fail_after_expiry() {
        let transport = Arc::new(RecordingTransport::default());
        let (ctx, _rx) = context(slash("ahoy", true), transport.clone());

        tokio::time::advance(TOKEN_VALIDITY + Duration::from_secs(1)).await;
        assert!(ctx.expired());

        assert!(ctx.edit_message("x").await.unwrap_err().is(ErrorKind::TokenExpired));
        assert!(ctx.edit_message_by_id("7", "x").await.unwrap_err().is(ErrorKind::TokenExpired));
        assert!(ctx.send_message("x").await.unwrap_err().is(ErrorKind::TokenExpired));
        assert!(transport.calls().is_empty());

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(ctx.expired());
    }

    #[tokio::test]
    async fn follow_ups_do_not_require_acknowledgment() {
        let transport = Arc::new(RecordingTransport::default());
        let (ctx, _rx) = context(slash("ahoy", true), transport.clone());
        ctx.send_message("early").await.unwrap();
        assert!(!ctx.replied());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn late_reply_still_marks_replied() {
        let (mut ctx, rx) = context(slash("ahoy", true), Arc::default());
        drop(rx);
        assert!(ctx.reply("late").unwrap_err().is(ErrorKind::ResponseUndelivered));
        assert!(ctx.replied());
        assert!(ctx.defer().unwrap_err().is(ErrorKind::ResponseAlreadySent));
    }
}
