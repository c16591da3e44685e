mod ahoy;
mod counter;
mod whois;

use std::sync::Arc;

use discord_interactions::{Commands, Component};

/// Commands served by the demo bot.
pub fn commands() -> Commands {
    Commands {
        slash: vec![Arc::new(ahoy::Ahoy), Arc::new(counter::Counter)],
        user: vec![Arc::new(whois::Whois)],
        message: Vec::new(),
    }
}

pub fn components() -> Vec<Arc<dyn Component>> {
    vec![Arc::new(counter::CounterButton)]
}
