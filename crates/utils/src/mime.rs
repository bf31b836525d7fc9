//! Raw RFC 5322 header-section parsing.
//!
//! The duplicator never restructures a message: the header section is
//! lifted into an ordered list once, and the body is carried as an opaque
//! byte range that is re-emitted untouched. This module provides that
//! single parsing step.

/// Parses the header section of a raw email, returning an ordered list of
/// headers and the byte offset at which the body starts.
///
/// Headers are preserved in their original order with case-preserved keys
/// and trimmed values. Duplicate headers (e.g. `Received`) are kept as
/// separate entries. Folded values keep their continuation lines, joined
/// with a CRLF so re-serialization reproduces the fold.
///
/// A line that is neither a header nor a continuation ends the header
/// section without being consumed, so malformed input degrades to a
/// body-only message instead of failing.
///
/// # Examples
///
/// ```rust
/// let raw = b"From: alice@example.com\r\nTo: bob@example.com\r\n\r\nHello!";
/// let (headers, offset) = kayako_dup_utils::parse_raw_headers(raw);
/// assert_eq!(headers.len(), 2);
/// assert_eq!(headers[0], ("From".to_string(), "alice@example.com".to_string()));
/// assert_eq!(raw[offset..], b"Hello!"[..]);
/// ```
///
/// A message without any header line is all body:
///
/// ```rust
/// let (headers, offset) = kayako_dup_utils::parse_raw_headers(b"Just plain text");
/// assert!(headers.is_empty());
/// assert_eq!(offset, 0);
/// ```
pub fn parse_raw_headers(raw: &[u8]) -> (Vec<(String, String)>, usize) {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        let (line, consumed) = match raw[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => {
                let end = pos + i;
                let line = if end > pos && raw[end - 1] == b'\r' {
                    &raw[pos..end - 1]
                } else {
                    &raw[pos..end]
                };
                (line, end + 1)
            }
            None => (&raw[pos..], raw.len()),
        };

        if line.is_empty() {
            // Blank separator line, the body starts right after it
            pos = consumed;
            break;
        }

        if line[0] == b' ' || line[0] == b'\t' {
            if let Some((_, value)) = headers.last_mut() {
                // Folded continuation, kept inside the value so the fold
                // survives re-serialization
                value.push_str("\r\n");
                value.push_str(String::from_utf8_lossy(line).trim_end());
                pos = consumed;
                continue;
            }
        }

        let text = String::from_utf8_lossy(line);
        match text.split_once(':') {
            Some((key, value)) => {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
            // Not a header line and not blank, the content starts here
            None => break,
        }

        pos = consumed;
    }

    (headers, pos)
}
