//! Batch duplication: one original message fanned out to N destinations.
//!
//! [`Duplicator`] composes the transformer pipeline and a
//! [`MessageHandler`]: for each destination it re-parses the original
//! bytes, runs the header transformations, and hands the copy to the
//! transport. The loop is fail-soft and exhaustive, every destination is
//! attempted exactly once and failures are collected rather than aborting
//! the batch.

use std::sync::Arc;

use regex::Regex;
use tracing::{error, info};

use crate::{
    apply_pipeline, parse_raw_headers, EmailMessage, LoopGuardTransformer, MessageHandler,
    MessageIdSource, MessageIdTransformer, MessageTransformer, RecipientTransformer,
    SubjectTagTransformer,
};

/// A destination the transport refused, with a human-readable cause.
#[derive(Debug, Clone)]
pub struct DispatchFailure {
    pub destination: String,
    pub cause: String,
}

/// Fans one raw message out into independently addressed copies.
pub struct Duplicator {
    ident: MessageIdSource,
    tag_length: usize,
    handler: Arc<dyn MessageHandler>,
}

impl Duplicator {
    /// Creates a new [`Duplicator`] dispatching through the given handler.
    pub fn new(ident: MessageIdSource, tag_length: usize, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            ident,
            tag_length,
            handler,
        }
    }

    /// Builds the per-destination transformer pipeline.
    fn pipeline(&self, destination: &str) -> Vec<Box<dyn MessageTransformer>> {
        vec![
            Box::new(RecipientTransformer::new(destination)),
            Box::new(MessageIdTransformer::new(self.ident.clone())),
            Box::new(SubjectTagTransformer::new(self.tag_length)),
            Box::new(LoopGuardTransformer),
        ]
    }

    /// Produces the transformed copy of `raw` for a single destination.
    ///
    /// Each call parses `raw` afresh, so copies never share mutable state
    /// and concurrent calls on the same bytes cannot interfere.
    pub async fn make_copy(
        &self,
        raw: &[u8],
        envelope_sender: &str,
        destination: &str,
    ) -> EmailMessage {
        let mut copy = EmailMessage::from_raw(envelope_sender, destination, raw);
        let transformers = self.pipeline(destination);
        apply_pipeline(&transformers, &mut copy).await;
        copy
    }

    /// Duplicates `raw` to every destination in input order.
    ///
    /// The envelope sender is extracted once from the original message's
    /// `From` header and reused for the whole batch. Destinations are
    /// processed strictly sequentially, one transport invocation at a
    /// time; a failure is recorded and the loop moves on. Returns the
    /// collected failures, empty on full success.
    pub async fn run(&self, raw: &[u8], destinations: &[String]) -> Vec<DispatchFailure> {
        let sender = envelope_sender(raw);
        info!(
            sender = %sender,
            destinations = destinations.len(),
            "Duplicating message"
        );

        let mut failures = Vec::new();
        for destination in destinations {
            let copy = self.make_copy(raw, &sender, destination).await;
            match self.handler.handle(&copy).await {
                Ok(()) => info!(
                    destination = %destination,
                    message_id = copy.header("Message-ID").unwrap_or(""),
                    "Copy dispatched"
                ),
                Err(e) => {
                    error!(destination = %destination, error = %e, "Dispatch failed");
                    failures.push(DispatchFailure {
                        destination: destination.clone(),
                        cause: e.to_string(),
                    });
                }
            }
        }
        failures
    }
}

/// Splits a comma-separated destination list, trimming entries and
/// discarding empty ones. Duplicates are kept: a repeated destination
/// yields two independently tracked copies.
pub fn parse_destinations(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts the bare address from a header value such as
/// `Display Name <user@example.com>`, falling back to the trimmed value
/// when no angle-bracket form is present.
pub fn extract_address(header_value: &str) -> String {
    let re = Regex::new(r"<([^>]+)>").unwrap();
    match re.captures(header_value).and_then(|caps| caps.get(1)) {
        Some(addr) => addr.as_str().to_string(),
        None => header_value.trim().to_string(),
    }
}

/// Extracts the envelope sender from the original message's `From` header,
/// empty when the header is absent.
pub fn envelope_sender(raw: &[u8]) -> String {
    let (headers, _) = parse_raw_headers(raw);
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("From"))
        .map(|(_, v)| extract_address(v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        handler::{HandlerError, HandlerFuture},
        DUP_MARKER_HEADER,
    };

    /// Handler that records every copy it receives.
    #[derive(Default)]
    struct RecordingHandler {
        copies: Mutex<Vec<EmailMessage>>,
    }

    impl RecordingHandler {
        fn copies(&self) -> Vec<EmailMessage> {
            self.copies.lock().unwrap().clone()
        }
    }

    impl MessageHandler for RecordingHandler {
        fn handle<'a>(&'a self, message: &'a EmailMessage) -> HandlerFuture<'a> {
            Box::pin(async move {
                self.copies.lock().unwrap().push(message.clone());
                Ok(())
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Handler that fails for one destination and records all attempts.
    struct FailingHandler {
        reject: String,
        attempts: Mutex<Vec<String>>,
    }

    impl FailingHandler {
        fn new(reject: &str) -> Self {
            Self {
                reject: reject.to_string(),
                attempts: Mutex::new(Vec::new()),
            }
        }
    }

    impl MessageHandler for FailingHandler {
        fn handle<'a>(&'a self, message: &'a EmailMessage) -> HandlerFuture<'a> {
            Box::pin(async move {
                self.attempts.lock().unwrap().push(message.to.clone());
                if message.to == self.reject {
                    Err(HandlerError::Transport(
                        "simulated transport failure".to_string(),
                    ))
                } else {
                    Ok(())
                }
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn duplicator(handler: Arc<dyn MessageHandler>) -> Duplicator {
        Duplicator::new(MessageIdSource::new("dup.example.com"), 4, handler)
    }

    const SIMPLE: &[u8] = b"From: Alice <alice@example.com>\r\n\
Date: Mon, 1 Jan 2024 00:00:00 +0000\r\n\
Subject: Hello\r\n\
Message-ID: <orig@x>\r\n\
In-Reply-To: <t@x>\r\n\
\r\n\
Hello world\r\n";

    #[tokio::test]
    async fn test_two_destinations_yield_distinct_copies() {
        let handler = Arc::new(RecordingHandler::default());
        let dup = duplicator(handler.clone());
        let destinations = vec!["a@x.com".to_string(), "b@x.com".to_string()];

        let failures = dup.run(SIMPLE, &destinations).await;

        assert!(failures.is_empty());
        let copies = handler.copies();
        assert_eq!(copies.len(), 2);

        assert_eq!(copies[0].header("To"), Some("a@x.com"));
        assert_eq!(copies[1].header("To"), Some("b@x.com"));

        let first_id = copies[0].header("Message-ID").unwrap();
        let second_id = copies[1].header("Message-ID").unwrap();
        assert_ne!(first_id, "<orig@x>");
        assert_ne!(second_id, "<orig@x>");
        assert_ne!(first_id, second_id);

        for copy in &copies {
            assert!(copy.subject().starts_with("Hello ["));
            assert!(copy.subject().ends_with(']'));
            assert_eq!(copy.header(DUP_MARKER_HEADER), Some("1"));
            assert_eq!(copy.header("In-Reply-To"), None);
            assert_eq!(copy.header("References"), None);
        }
        assert_ne!(copies[0].subject(), copies[1].subject());
    }

    #[tokio::test]
    async fn test_untouched_headers_and_body_survive() {
        let handler = Arc::new(RecordingHandler::default());
        let dup = duplicator(handler.clone());

        dup.run(SIMPLE, &["a@x.com".to_string()]).await;

        let copies = handler.copies();
        assert_eq!(copies[0].header("From"), Some("Alice <alice@example.com>"));
        assert_eq!(
            copies[0].header("Date"),
            Some("Mon, 1 Jan 2024 00:00:00 +0000")
        );
        assert_eq!(copies[0].body(), b"Hello world\r\n");
    }

    #[tokio::test]
    async fn test_envelope_sender_extracted_once_for_batch() {
        let handler = Arc::new(RecordingHandler::default());
        let dup = duplicator(handler.clone());
        let destinations = vec!["a@x.com".to_string(), "b@x.com".to_string()];

        dup.run(SIMPLE, &destinations).await;

        for copy in handler.copies() {
            assert_eq!(copy.from, "alice@example.com");
        }
    }

    #[tokio::test]
    async fn test_missing_from_header_yields_empty_sender() {
        let handler = Arc::new(RecordingHandler::default());
        let dup = duplicator(handler.clone());

        dup.run(b"Subject: Hi\r\n\r\nBody", &["a@x.com".to_string()])
            .await;

        assert_eq!(handler.copies()[0].from, "");
    }

    #[tokio::test]
    async fn test_multipart_structure_is_invariant() {
        let raw: &[u8] = b"From: a@x.com\r\n\
Subject: Report\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: text/plain\r\n\
\r\n\
part one\r\n\
--XYZ\r\n\
Content-Type: text/html\r\n\
\r\n\
<p>part two</p>\r\n\
--XYZ\r\n\
Content-Type: application/octet-stream\r\n\
\r\n\
part three\r\n\
--XYZ--\r\n";
        let handler = Arc::new(RecordingHandler::default());
        let dup = duplicator(handler.clone());

        dup.run(raw, &["a@x.com".to_string()]).await;

        let copy = &handler.copies()[0];
        let (_, body_offset) = parse_raw_headers(raw);
        assert_eq!(copy.body(), &raw[body_offset..]);
        let parts = copy
            .body()
            .windows(b"--XYZ\r\n".len())
            .filter(|w| w == b"--XYZ\r\n")
            .count();
        assert_eq!(parts, 3);
        assert_eq!(
            copy.header("Content-Type"),
            Some("multipart/mixed; boundary=\"XYZ\"")
        );
    }

    #[tokio::test]
    async fn test_repeated_destination_gets_independent_copies() {
        let handler = Arc::new(RecordingHandler::default());
        let dup = duplicator(handler.clone());
        let destinations = vec!["a@x.com".to_string(), "a@x.com".to_string()];

        let failures = dup.run(SIMPLE, &destinations).await;

        assert!(failures.is_empty());
        let copies = handler.copies();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].header("To"), Some("a@x.com"));
        assert_eq!(copies[1].header("To"), Some("a@x.com"));
        assert_ne!(
            copies[0].header("Message-ID"),
            copies[1].header("Message-ID")
        );
        assert_ne!(copies[0].subject(), copies[1].subject());
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let handler = Arc::new(FailingHandler::new("b@x.com"));
        let dup = duplicator(handler.clone());
        let destinations = vec![
            "a@x.com".to_string(),
            "b@x.com".to_string(),
            "c@x.com".to_string(),
        ];

        let failures = dup.run(SIMPLE, &destinations).await;

        let attempts = handler.attempts.lock().unwrap().clone();
        assert_eq!(attempts, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].destination, "b@x.com");
        assert!(failures[0].cause.contains("simulated transport failure"));
    }

    #[test]
    fn test_parse_destinations_trims_and_drops_empties() {
        assert_eq!(
            parse_destinations(" a@x.com , b@x.com ,, , c@x.com"),
            vec!["a@x.com", "b@x.com", "c@x.com"]
        );
    }

    #[test]
    fn test_parse_destinations_keeps_duplicates_and_order() {
        assert_eq!(
            parse_destinations("b@x.com,a@x.com,b@x.com"),
            vec!["b@x.com", "a@x.com", "b@x.com"]
        );
    }

    #[test]
    fn test_parse_destinations_all_empty() {
        assert!(parse_destinations(" , ,").is_empty());
        assert!(parse_destinations("").is_empty());
    }

    #[test]
    fn test_extract_address_forms() {
        assert_eq!(
            extract_address("Alice Example <alice@example.com>"),
            "alice@example.com"
        );
        assert_eq!(extract_address("  bob@example.com  "), "bob@example.com");
        assert_eq!(extract_address(""), "");
    }

    #[test]
    fn test_envelope_sender_from_raw() {
        assert_eq!(envelope_sender(SIMPLE), "alice@example.com");
        assert_eq!(envelope_sender(b"Subject: Hi\r\n\r\nBody"), "");
    }
}
