use tracing::debug;

use crate::{EmailMessage, MessageTransformer, TransformFuture};

/// Transformer that replaces the `To` header with a single destination.
///
/// The downstream ticketing system accepts and assigns a message based on
/// its `To` address, so the header must match the target queue exactly.
/// Any pre-existing recipients are discarded.
pub struct RecipientTransformer {
    destination: String,
}

impl RecipientTransformer {
    /// Creates a new [`RecipientTransformer`] for the given destination.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }
}

impl MessageTransformer for RecipientTransformer {
    fn transform<'a>(&'a self, message: &'a mut EmailMessage) -> TransformFuture<'a> {
        Box::pin(async move {
            debug!(destination = %self.destination, "Rewriting To header");
            message.set_header("To", &self.destination);
        })
    }

    fn name(&self) -> &str {
        "recipient"
    }
}
