use std::{error::Error, fmt::Display, future::Future, pin::Pin};

use crate::EmailMessage;

/// Result type for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Boxed future type for handler operations, enabling object safety.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult<()>> + Send + 'a>>;

/// Errors that can occur while handing a copy to the mail transport.
#[derive(Debug)]
pub enum HandlerError {
    /// The transport process could not be started.
    Spawn(String),
    /// The transport ran and signalled failure.
    Transport(String),
    /// An I/O error occurred while feeding the transport.
    Io(String),
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Spawn(msg) => write!(f, "Spawn error: {msg}"),
            HandlerError::Transport(msg) => write!(f, "Transport error: {msg}"),
            HandlerError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl Error for HandlerError {}

/// Trait for handlers that deliver one finished copy.
///
/// A handler receives the fully transformed copy together with its
/// envelope addresses ([`EmailMessage::from`], [`EmailMessage::to`]) and
/// performs exactly one delivery attempt. Failures are returned, never
/// retried; the dispatch loop decides what a failure means for the batch.
pub trait MessageHandler: Send + Sync {
    /// Delivers an email message copy.
    fn handle<'a>(&'a self, message: &'a EmailMessage) -> HandlerFuture<'a>;

    /// Returns the name of this handler.
    fn name(&self) -> &str;
}
