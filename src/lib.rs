//! Signed Discord interaction webhooks: verification, routing to command and
//! component handlers, and the initial-response/follow-up lifecycle.
//!
//! The transport hands raw bytes to [`DiscordApplication::handle_interaction`]
//! and sends back whatever initial response it returns. Handlers receive an
//! [`InteractionContext`] and may keep following up after that.

pub mod application;
pub mod commands;
pub mod components;
pub mod config;
pub mod context;
pub mod discord;
pub mod dispatch;
pub mod error;
pub mod hooks;
pub mod types;

pub use application::{ApplicationOptions, DiscordApplication, RegistrationPolicy};
pub use commands::{Command, CommandDefinition, Commands};
pub use components::{Component, ComponentDefinition, custom_id};
pub use context::InteractionContext;
pub use dispatch::DispatchOutcome;
pub use error::{BotError, ErrorKind, Result};
pub use hooks::{Hook, HookOutcome, HookSet};
