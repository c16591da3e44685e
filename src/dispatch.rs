use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::commands::CommandRegistry;
use crate::components::ComponentRegistry;
use crate::context::{Event, InteractionContext, Responder};
use crate::discord::message::simple_error;
use crate::discord::webhook::{Webhook, WebhookTransport};
use crate::error::Result;
use crate::hooks::{HookOutcome, HookSet};
use crate::types::discord::{CommandType, ComponentType, Interaction, InteractionResponse, InteractionType};

pub const COMMAND_NOT_FOUND: &str = "Command not found.";
pub const COMPONENT_NOT_FOUND: &str = "Component not found.";
pub const SERVER_REQUIRED: &str = "This command can only be used within a Discord server.";
pub const SERVER_REQUIRED_TITLE: &str = "Server Required";

/// How an interaction was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Pong,
    /// A hook answered; no handler ran.
    Intercepted,
    Handled,
    CommandNotFound,
    ComponentNotFound,
    GuildRequired,
}

enum Route {
    Command(CommandType, String),
    Autocomplete(String),
    Component(ComponentType, String),
}

/// Routes verified interactions to hooks and handlers.
pub struct Dispatcher {
    commands: CommandRegistry,
    components: ComponentRegistry,
    hooks: HookSet,
    webhooks: Arc<dyn WebhookTransport>,
}

impl Dispatcher {
    pub fn new(
        commands: CommandRegistry,
        components: ComponentRegistry,
        hooks: HookSet,
        webhooks: Arc<dyn WebhookTransport>,
    ) -> Self {
        Self {
            commands,
            components,
            hooks,
            webhooks,
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub async fn dispatch(
        &self,
        interaction: Interaction,
        mut responder: Responder,
        received_at: Instant,
    ) -> Result<DispatchOutcome> {
        if interaction.kind() == InteractionType::Ping {
            responder.deliver(InteractionResponse::pong())?;
            return Ok(DispatchOutcome::Pong);
        }

        let event = Event::classify(&interaction)?;
        let webhook = Webhook::new(self.webhooks.clone(), &interaction.application_id, &interaction.token);
        let mut ctx = InteractionContext::new(interaction, event, responder, webhook, received_at);
        debug!(
            interaction_id = %ctx.interaction().id,
            name = ctx.name(),
            "dispatching interaction"
        );

        if let Some(hook) = self.hooks.for_event(ctx.event()) {
            if let HookOutcome::Respond(response) = hook.run(&mut ctx).await? {
                ctx.raw_reply(response)?;
                return Ok(DispatchOutcome::Intercepted);
            }
        }

        let route = match ctx.event() {
            Event::Command(command) => Route::Command(command.kind, command.name.clone()),
            Event::Autocomplete(command) => Route::Autocomplete(command.name.clone()),
            Event::Component(component) => Route::Component(component.kind, component.id.clone()),
        };

        match route {
            Route::Command(kind, name) => self.run_command(&mut ctx, kind, &name).await,
            Route::Autocomplete(name) => self.run_autocomplete(&mut ctx, &name).await,
            Route::Component(kind, id) => self.run_component(&mut ctx, kind, &id).await,
        }
    }

    async fn run_command(
        &self,
        ctx: &mut InteractionContext,
        kind: CommandType,
        name: &str,
    ) -> Result<DispatchOutcome> {
        let Some(command) = self.commands.get(kind, name) else {
            warn!(command = name, ?kind, "command not found");
            ctx.reply(simple_error(COMMAND_NOT_FOUND, None))?;
            return Ok(DispatchOutcome::CommandNotFound);
        };

        if command.definition.guild_only && ctx.is_dm() {
            ctx.reply(simple_error(SERVER_REQUIRED, Some(SERVER_REQUIRED_TITLE)))?;
            return Ok(DispatchOutcome::GuildRequired);
        }

        command.handler.handle(ctx).await?;
        Ok(DispatchOutcome::Handled)
    }

    async fn run_autocomplete(&self, ctx: &mut InteractionContext, name: &str) -> Result<DispatchOutcome> {
        let Some(command) = self.commands.get(CommandType::ChatInput, name) else {
            warn!(command = name, "autocomplete for unknown command");
            ctx.respond_choices(Vec::new())?;
            return Ok(DispatchOutcome::CommandNotFound);
        };

        command.handler.autocomplete(ctx).await?;
        Ok(DispatchOutcome::Handled)
    }

    async fn run_component(
        &self,
        ctx: &mut InteractionContext,
        kind: ComponentType,
        id: &str,
    ) -> Result<DispatchOutcome> {
        let Some(component) = self.components.get(kind, id) else {
            warn!(component = id, ?kind, "component not found");
            ctx.reply(simple_error(COMPONENT_NOT_FOUND, None))?;
            return Ok(DispatchOutcome::ComponentNotFound);
        };

        component.handle(ctx).await?;
        Ok(DispatchOutcome::Handled)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::commands::{Command, CommandDefinition, Commands};
    use crate::components::{Component, ComponentDefinition};
    use crate::context::tests::{button, interaction, slash};
    use crate::discord::message::MessageBuilder;
    use crate::discord::webhook::testing::RecordingTransport;
    use crate::error::ErrorKind;
    use crate::hooks::Hook;
    use crate::types::discord::{AutocompleteChoice, ResponseType};

    #[derive(Default)]
    pub(crate) struct Counter(AtomicUsize);

    impl Counter {
        pub(crate) fn get(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }

        fn bump(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) struct Echo {
        pub(crate) definition: CommandDefinition,
        pub(crate) calls: Arc<Counter>,
    }

    #[async_trait]
    impl Command for Echo {
        fn definition(&self) -> CommandDefinition {
            self.definition.clone()
        }

        async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
            self.calls.bump();
            ctx.reply(format!("echo {}", ctx.name()))
        }

        async fn autocomplete(&self, ctx: &mut InteractionContext) -> Result<()> {
            let typed = ctx
                .focused_option()
                .and_then(|o| o.value.clone())
                .unwrap_or_default();
            ctx.respond_choices(vec![AutocompleteChoice { name: "typed".into(), value: typed }])
        }
    }

    struct Buy {
        seen: Arc<Mutex<Vec<(Vec<String>, Vec<String>)>>>,
    }

    #[async_trait]
    impl Component for Buy {
        fn definition(&self) -> ComponentDefinition {
            ComponentDefinition::button("buy")
        }

        async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((ctx.args().to_vec(), ctx.values().to_vec()));
            ctx.defer()
        }
    }

    struct Intercept(InteractionResponse);

    #[async_trait]
    impl Hook for Intercept {
        async fn run(&self, _ctx: &mut InteractionContext) -> Result<HookOutcome> {
            Ok(HookOutcome::Respond(self.0.clone()))
        }
    }

    struct Pass(Arc<Counter>);

    #[async_trait]
    impl Hook for Pass {
        async fn run(&self, _ctx: &mut InteractionContext) -> Result<HookOutcome> {
            self.0.bump();
            Ok(HookOutcome::Continue)
        }
    }

    struct Fixture {
        dispatcher: Dispatcher,
        calls: Arc<Counter>,
        seen: Arc<Mutex<Vec<(Vec<String>, Vec<String>)>>>,
    }

    fn fixture(hooks: HookSet) -> Fixture {
        let calls = Arc::new(Counter::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let commands = CommandRegistry::new(Commands {
            slash: vec![
                Arc::new(Echo {
                    definition: CommandDefinition::new("ahoy", "greeting"),
                    calls: calls.clone(),
                }),
                Arc::new(Echo {
                    definition: CommandDefinition::new("ban", "guild only").guild_only(),
                    calls: calls.clone(),
                }),
            ],
            ..Commands::default()
        })
        .unwrap();
        let components = ComponentRegistry::new(vec![Arc::new(Buy { seen: seen.clone() })]).unwrap();
        Fixture {
            dispatcher: Dispatcher::new(commands, components, hooks, Arc::new(RecordingTransport::default())),
            calls,
            seen,
        }
    }

    async fn run(dispatcher: &Dispatcher, interaction: Interaction) -> (Result<DispatchOutcome>, Vec<InteractionResponse>) {
        let (responder, mut rx) = Responder::channel();
        let outcome = dispatcher.dispatch(interaction, responder, Instant::now()).await;
        let delivered = rx.try_recv().into_iter().collect();
        (outcome, delivered)
    }

    #[tokio::test]
    async fn ping_gets_pong() {
        let f = fixture(HookSet::default());
        let ping = interaction(json!({ "id": "1", "application_id": "42", "type": 1, "token": "tok" }));
        let (outcome, delivered) = run(&f.dispatcher, ping).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Pong);
        assert_eq!(delivered, vec![InteractionResponse::pong()]);
    }

    #[tokio::test]
    async fn invokes_registered_command() {
        let f = fixture(HookSet::default());
        let (outcome, delivered) = run(&f.dispatcher, slash("ahoy", true)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Handled);
        assert_eq!(f.calls.get(), 1);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].response_type, ResponseType::ChannelMessageWithSource as u8);
    }

    #[tokio::test]
    async fn unknown_command_gets_not_found_reply() {
        let f = fixture(HookSet::default());
        let (outcome, delivered) = run(&f.dispatcher, slash("gone", true)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::CommandNotFound);
        assert_eq!(f.calls.get(), 0);
        assert_eq!(
            delivered,
            vec![InteractionResponse::message(
                ResponseType::ChannelMessageWithSource,
                simple_error(COMMAND_NOT_FOUND, None).build()
            )]
        );
    }

    #[tokio::test]
    async fn guild_only_command_in_dm_gets_server_required() {
        let f = fixture(HookSet::default());
        let (outcome, delivered) = run(&f.dispatcher, slash("ban", false)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::GuildRequired);
        assert_eq!(f.calls.get(), 0);
        assert_eq!(
            delivered,
            vec![InteractionResponse::message(
                ResponseType::ChannelMessageWithSource,
                simple_error(SERVER_REQUIRED, Some(SERVER_REQUIRED_TITLE)).build()
            )]
        );

        let (outcome, _) = run(&f.dispatcher, slash("ban", true)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Handled);
        assert_eq!(f.calls.get(), 1);
    }

    #[tokio::test]
    async fn short_circuiting_hook_replaces_handler() {
        let canned = InteractionResponse::message(
            ResponseType::ChannelMessageWithSource,
            MessageBuilder::new().content("maintenance").ephemeral().build(),
        );
        let f = fixture(HookSet {
            slash_command: Some(Arc::new(Intercept(canned.clone()))),
            ..HookSet::default()
        });

        let (outcome, delivered) = run(&f.dispatcher, slash("ahoy", true)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Intercepted);
        assert_eq!(f.calls.get(), 0);
        assert_eq!(delivered, vec![canned]);
    }

    #[tokio::test]
    async fn continuing_hook_runs_before_handler() {
        let hook_calls = Arc::new(Counter::default());
        let f = fixture(HookSet {
            slash_command: Some(Arc::new(Pass(hook_calls.clone()))),
            ..HookSet::default()
        });

        let (outcome, _) = run(&f.dispatcher, slash("ahoy", true)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Handled);
        assert_eq!(hook_calls.get(), 1);
        assert_eq!(f.calls.get(), 1);
    }

    #[tokio::test]
    async fn hook_for_other_category_is_skipped() {
        let canned = InteractionResponse::pong();
        let f = fixture(HookSet {
            button: Some(Arc::new(Intercept(canned))),
            ..HookSet::default()
        });
        let (outcome, _) = run(&f.dispatcher, slash("ahoy", true)).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Handled);
    }

    #[tokio::test]
    async fn button_hook_short_circuits_component() {
        let canned = InteractionResponse::message(
            ResponseType::UpdateMessage,
            MessageBuilder::new().content("shop closed").build(),
        );
        let f = fixture(HookSet {
            button: Some(Arc::new(Intercept(canned.clone()))),
            ..HookSet::default()
        });

        let (outcome, delivered) = run(&f.dispatcher, button("buy|123|gold")).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Intercepted);
        assert_eq!(delivered, vec![canned]);
        assert!(f.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn component_receives_identifier_arguments() {
        let f = fixture(HookSet::default());
        let (outcome, delivered) = run(&f.dispatcher, button("buy|123|gold")).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Handled);
        assert_eq!(delivered[0].response_type, ResponseType::DeferredUpdateMessage as u8);
        assert_eq!(
            f.seen.lock().unwrap().clone(),
            vec![(vec!["123".to_string(), "gold".to_string()], Vec::new())]
        );
    }

    #[tokio::test]
    async fn unknown_component_gets_not_found_reply() {
        let f = fixture(HookSet::default());
        let (outcome, delivered) = run(&f.dispatcher, button("sell|1")).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::ComponentNotFound);
        assert_eq!(
            delivered,
            vec![InteractionResponse::message(
                ResponseType::UpdateMessage,
                simple_error(COMPONENT_NOT_FOUND, None).build()
            )]
        );
    }

    #[tokio::test]
    async fn malformed_identifier_fails_without_reply() {
        let f = fixture(HookSet::default());
        let (outcome, delivered) = run(&f.dispatcher, button("")).await;
        assert!(outcome.unwrap_err().is(ErrorKind::MalformedComponentIdentifier));
        assert!(delivered.is_empty());
        assert!(f.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_interaction_is_rejected() {
        let f = fixture(HookSet::default());
        let modal = interaction(json!({
            "id": "1", "application_id": "42", "type": 5, "token": "tok", "data": { "custom_id": "form" }
        }));
        let (outcome, delivered) = run(&f.dispatcher, modal).await;
        assert!(outcome.unwrap_err().is(ErrorKind::UnsupportedInteraction));
        assert!(delivered.is_empty());
    }

    #[tokio::test]
    async fn autocomplete_routes_to_slash_command() {
        let f = fixture(HookSet::default());
        let request = interaction(json!({
            "id": "1", "application_id": "42", "type": 4, "token": "tok",
            "data": { "name": "ahoy", "type": 1, "options": [{ "name": "who", "type": 3, "value": "cr", "focused": true }] }
        }));
        let (outcome, delivered) = run(&f.dispatcher, request).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::Handled);
        assert_eq!(
            delivered,
            vec![InteractionResponse::choices(vec![AutocompleteChoice { name: "typed".into(), value: json!("cr") }])]
        );
        assert_eq!(f.calls.get(), 0);
    }

    #[tokio::test]
    async fn autocomplete_for_unknown_command_offers_nothing() {
        let f = fixture(HookSet::default());
        let request = interaction(json!({
            "id": "1", "application_id": "42", "type": 4, "token": "tok",
            "data": { "name": "gone", "type": 1 }
        }));
        let (outcome, delivered) = run(&f.dispatcher, request).await;
        assert_eq!(outcome.unwrap(), DispatchOutcome::CommandNotFound);
        assert_eq!(delivered, vec![InteractionResponse::choices(Vec::new())]);
    }
}
