use tracing::debug;

use crate::{EmailMessage, MessageTransformer, TransformFuture};

/// Sentinel header marking a message as a duplicator-produced copy.
///
/// A caller that re-processes inbound mail can check for this header and
/// skip messages the duplicator already emitted.
pub const DUP_MARKER_HEADER: &str = "X-Kayako-Dup";

/// Transformer that marks a copy against re-processing and detaches it
/// from its original thread.
///
/// Sets [`DUP_MARKER_HEADER`] to `"1"` and strips `In-Reply-To` and
/// `References`, since the downstream system threads messages sharing
/// those headers into an existing ticket instead of opening a new one.
pub struct LoopGuardTransformer;

impl MessageTransformer for LoopGuardTransformer {
    fn transform<'a>(&'a self, message: &'a mut EmailMessage) -> TransformFuture<'a> {
        Box::pin(async move {
            debug!("Marking copy and stripping threading headers");
            message.set_header(DUP_MARKER_HEADER, "1");
            message.remove_header("In-Reply-To");
            message.remove_header("References");
        })
    }

    fn name(&self) -> &str {
        "loop_guard"
    }
}
