//! Header transformations applied to each duplicated copy.
//!
//! A copy is produced by running a fresh parse of the original message
//! through an ordered pipeline of transformers, one per header rule:
//! recipient rewrite, `Message-ID` replacement, subject tagging, and the
//! anti-loop guard. Transformers mutate headers in place and never touch
//! the body; [`apply_pipeline`] re-serializes the message once at the end.

use std::{future::Future, pin::Pin};

use tracing::debug;

use crate::EmailMessage;

pub mod loop_guard;
pub mod message_id;
pub mod recipient;
pub mod subject_tag;

pub use loop_guard::*;
pub use message_id::*;
pub use recipient::*;
pub use subject_tag::*;

/// Boxed future type for transformer operations, enabling async transformers.
pub type TransformFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Trait for message transformers that modify copies in the pipeline.
///
/// Transformers run between the per-destination parse and the transport
/// handoff, allowing in-place modification of the header list. Two
/// pipelines over separately parsed copies share no mutable state and may
/// run concurrently.
pub trait MessageTransformer: Send + Sync {
    /// Transforms an email message in place.
    fn transform<'a>(&'a self, message: &'a mut EmailMessage) -> TransformFuture<'a>;

    /// Returns the name of this transformer.
    fn name(&self) -> &str;
}

/// Applies a list of transformers to a message in order, then rebuilds the
/// cached serialization so [`EmailMessage::raw`] reflects the changes.
pub async fn apply_pipeline(
    transformers: &[Box<dyn MessageTransformer>],
    message: &mut EmailMessage,
) {
    for transformer in transformers {
        debug!(transformer = transformer.name(), "Applying transformer");
        transformer.transform(message).await;
    }
    message.rebuild();
}
