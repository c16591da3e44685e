use tokio::sync::oneshot;

use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::InteractionResponse;

/// One-shot capability for delivering the initial response back to the transport.
#[derive(Debug)]
pub struct Responder {
    sender: Option<oneshot::Sender<InteractionResponse>>,
}

impl Responder {
    pub fn channel() -> (Self, oneshot::Receiver<InteractionResponse>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender: Some(sender) }, receiver)
    }

    pub fn is_spent(&self) -> bool {
        self.sender.is_none()
    }

    /// Deliver `response`. Only the first call gets through; the sender is spent
    /// even when the transport has stopped listening.
    pub fn deliver(&mut self, response: InteractionResponse) -> Result<()> {
        let sender = self
            .sender
            .take()
            .ok_or_else(|| BotError::kind(ErrorKind::ResponseAlreadySent))?;

        sender
            .send(response)
            .map_err(|_| BotError::kind(ErrorKind::ResponseUndelivered))
    }
}
