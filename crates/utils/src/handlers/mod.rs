//! Concrete [`MessageHandler`](crate::MessageHandler) implementations.
//!
//! Contains [`SendmailHandler`], which re-injects copies through a local
//! sendmail-compatible binary, one process per copy.

pub mod sendmail;

pub use sendmail::*;
