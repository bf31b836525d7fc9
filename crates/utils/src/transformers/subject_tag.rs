use tracing::debug;

use crate::{ident::random_tag, EmailMessage, MessageTransformer, TransformFuture};

/// Transformer that appends a random bracketed tag to the `Subject` header.
///
/// The original subject (empty string if absent) is kept as a prefix and
/// the tag is appended as `"<original> [TAG]"` with a single separating
/// space. A message with no subject therefore ends up with the value
/// `" [TAG]"`. The tag is a secondary, human-visible distinguisher; the
/// `Message-ID` remains the authoritative one.
pub struct SubjectTagTransformer {
    tag_length: usize,
}

impl SubjectTagTransformer {
    /// Creates a new [`SubjectTagTransformer`] with the given tag length.
    pub fn new(tag_length: usize) -> Self {
        Self { tag_length }
    }
}

impl MessageTransformer for SubjectTagTransformer {
    fn transform<'a>(&'a self, message: &'a mut EmailMessage) -> TransformFuture<'a> {
        Box::pin(async move {
            let subject = message.subject().to_string();
            let tagged = format!("{} [{}]", subject, random_tag(self.tag_length));
            debug!(subject = %tagged, "Tagging Subject header");
            message.set_header("Subject", &tagged);
        })
    }

    fn name(&self) -> &str {
        "subject_tag"
    }
}
