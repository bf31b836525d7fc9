use tracing::debug;

use crate::{EmailMessage, MessageIdSource, MessageTransformer, TransformFuture};

/// Transformer that replaces the `Message-ID` header with a fresh identifier.
///
/// The `Message-ID` is the primary deduplication key downstream; every
/// copy must carry a distinct one or sibling copies collapse into a single
/// ticket. The original identifier is discarded unconditionally.
pub struct MessageIdTransformer {
    source: MessageIdSource,
}

impl MessageIdTransformer {
    /// Creates a new [`MessageIdTransformer`] drawing from the given source.
    pub fn new(source: MessageIdSource) -> Self {
        Self { source }
    }
}

impl MessageTransformer for MessageIdTransformer {
    fn transform<'a>(&'a self, message: &'a mut EmailMessage) -> TransformFuture<'a> {
        Box::pin(async move {
            let value = self.source.generate();
            debug!(
                old_id = message.header("Message-ID").unwrap_or(""),
                message_id = %value,
                "Replacing Message-ID header"
            );
            message.set_header("Message-ID", &value);
        })
    }

    fn name(&self) -> &str {
        "message_id"
    }
}
