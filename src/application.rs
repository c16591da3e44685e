use std::sync::Arc;

use ed25519_dalek::VerifyingKey;
use tokio::time::{Duration, Instant, timeout};
use tracing::{debug, warn};

use crate::commands::{CommandRegistry, Commands};
use crate::components::{Component, ComponentRegistry};
use crate::context::Responder;
use crate::discord::api::RestClient;
use crate::discord::signature::{self, KeyMaterial};
use crate::discord::webhook::WebhookTransport;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::{BotError, ErrorKind, Result};
use crate::hooks::HookSet;
use crate::types::discord::{Interaction, InteractionResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

/// Settings handed to the command registrar; this crate only carries them.
#[derive(Debug, Clone, Default)]
pub struct RegistrationPolicy {
    pub token: String,
    /// Overwrite remote commands that differ from the local declaration.
    pub overwrite_existing: bool,
    /// Delete remote commands that are not declared locally.
    pub remove_unregistered: bool,
}

pub struct ApplicationOptions {
    pub client_id: String,
    pub public_key: KeyMaterial,
    pub token: String,
    pub overwrite_existing: bool,
    pub remove_unregistered: bool,
    pub commands: Commands,
    pub components: Vec<Arc<dyn Component>>,
    pub hooks: HookSet,
    /// How long to wait for the initial response.
    pub timeout: Option<Duration>,
    /// Follow-up transport; the Discord REST API when unset.
    pub webhooks: Option<Arc<dyn WebhookTransport>>,
}

impl ApplicationOptions {
    pub fn new(client_id: &str, public_key: impl Into<KeyMaterial>, token: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            public_key: public_key.into(),
            token: token.to_string(),
            overwrite_existing: false,
            remove_unregistered: false,
            commands: Commands::default(),
            components: Vec::new(),
            hooks: HookSet::default(),
            timeout: None,
            webhooks: None,
        }
    }
}

pub struct DiscordApplication {
    client_id: String,
    public_key: VerifyingKey,
    timeout: Duration,
    registration: RegistrationPolicy,
    dispatcher: Dispatcher,
}

impl DiscordApplication {
    /// Validate the key and build the registries. Any configuration error surfaces here.
    pub fn new(options: ApplicationOptions) -> Result<Self> {
        let public_key = signature::decode_public_key(&options.public_key)?;
        let commands = CommandRegistry::new(options.commands)?;
        let components = ComponentRegistry::new(options.components)?;
        let webhooks = options
            .webhooks
            .unwrap_or_else(|| Arc::new(RestClient::default()));

        debug!(
            client_id = %options.client_id,
            commands = commands.len(),
            components = components.len(),
            "application configured"
        );

        Ok(Self {
            client_id: options.client_id,
            public_key,
            timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT),
            registration: RegistrationPolicy {
                token: options.token,
                overwrite_existing: options.overwrite_existing,
                remove_unregistered: options.remove_unregistered,
            },
            dispatcher: Dispatcher::new(commands, components, options.hooks, webhooks),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registration(&self) -> &RegistrationPolicy {
        &self.registration
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn verify(&self, timestamp: &str, signature: &str, body: &[u8]) -> bool {
        signature::verify(&self.public_key, timestamp, signature, body)
    }

    /// Verify, parse and dispatch one raw interaction, returning its initial response.
    ///
    /// The handler runs on its own task. Once it acknowledges, or the timeout
    /// passes, this returns while the handler may continue with follow-ups.
    pub async fn handle_interaction(
        self: &Arc<Self>,
        timestamp: &str,
        signature: &str,
        body: &[u8],
    ) -> Result<InteractionResponse> {
        let received_at = Instant::now();

        if !self.verify(timestamp, signature, body) {
            return Err(BotError::kind(ErrorKind::VerificationFailed));
        }

        let interaction: Interaction = serde_json::from_slice(body)
            .map_err(|e| BotError::kind(ErrorKind::MalformedInteraction).push_std(e))?;
        let interaction_id = interaction.id.clone();

        let (responder, response) = Responder::channel();
        let app = Arc::clone(self);
        let task = tokio::spawn(async move {
            app.dispatcher
                .dispatch(interaction, responder, received_at)
                .await
        });

        match timeout(self.timeout, response).await {
            Ok(Ok(response)) => {
                tokio::spawn(report_late_failure(interaction_id, task));
                Ok(response)
            }
            // Responder dropped unused: dispatch ended without acknowledging.
            Ok(Err(_)) => match task.await {
                Ok(Err(e)) => Err(e),
                Ok(Ok(outcome)) => Err(BotError::kind(ErrorKind::NoResponse)
                    .push_str(format!("interaction {} settled as {:?}", interaction_id, outcome))),
                Err(join) => Err(BotError::kind(ErrorKind::NoResponse).push_std(join)),
            },
            Err(_) => {
                warn!(%interaction_id, timeout_ms = self.timeout.as_millis() as u64, "handler timed out");
                tokio::spawn(report_late_failure(interaction_id.clone(), task));
                Err(BotError::kind(ErrorKind::HandlerTimedOut)
                    .push_str(format!("interaction {}", interaction_id)))
            }
        }
    }
}

async fn report_late_failure(interaction_id: String, task: tokio::task::JoinHandle<Result<DispatchOutcome>>) {
    match task.await {
        Ok(Ok(outcome)) => debug!(%interaction_id, ?outcome, "interaction settled"),
        Ok(Err(e)) => {
            warn!(%interaction_id, "handler failed after responding");
            e.log_tree();
        }
        Err(e) => warn!(%interaction_id, error = %e, "handler task aborted"),
    }
}
