//! Core email message type used by the duplication pipeline.
//!
//! This module defines [`EmailMessage`], a structured view over one raw
//! [RFC 5322](https://www.rfc-editor.org/rfc/rfc5322) email: an ordered
//! header list plus an opaque body. The body (including any multipart
//! sub-structure) is carried as raw bytes and is never modified, only the
//! named headers touched by the transformers change between the original
//! and a dispatched copy.

use crate::parse_raw_headers;

/// A parsed email message together with its transport envelope.
///
/// Headers are stored as an ordered `Vec` (preserving RFC 5322 order and
/// supporting duplicate headers such as `Received`). A cached `raw` field
/// holds the full serialized form; call [`rebuild`](Self::rebuild) after
/// modifying headers so that [`raw`](Self::raw) reflects the changes.
///
/// `from` and `to` are the transport-level envelope addresses. They are
/// handed to the mail transport separately from the header values of the
/// same name, per standard envelope-vs-header mail semantics.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Envelope sender address used at transport handoff.
    pub from: String,

    /// Envelope recipient address used at transport handoff.
    pub to: String,

    /// Ordered list of headers (case-preserved keys, trimmed values).
    headers: Vec<(String, String)>,

    /// Message body after the blank-line separator, kept as raw bytes.
    body: Vec<u8>,

    /// Cached full serialization (headers + blank line + body).
    /// Rebuilt via [`rebuild`](Self::rebuild) after header mutations.
    raw: Vec<u8>,
}

impl EmailMessage {
    /// Parses `raw` into a new message with the given envelope addresses.
    ///
    /// Parsing is infallible: content that does not look like a header
    /// section simply lands in the body unchanged.
    pub fn new(from: String, to: String, raw: &[u8]) -> Self {
        let (headers, body_offset) = parse_raw_headers(raw);
        Self {
            from,
            to,
            headers,
            body: raw[body_offset..].to_vec(),
            raw: raw.to_vec(),
        }
    }

    pub fn from_raw(from: &str, to: &str, raw: &[u8]) -> Self {
        Self::new(from.to_string(), to.to_string(), raw)
    }

    /// Returns the first header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the email subject (convenience for `header("Subject")`).
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or_default()
    }

    /// Returns a reference to the ordered header list.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the message body after the header section (RFC 5322 body).
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the full serialized email (headers + blank line + body).
    ///
    /// Returns the cached [`Self::raw`] field. Call [`rebuild`](Self::rebuild)
    /// after modifying headers to ensure this is up to date.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Replaces every occurrence of `name` with a single header carrying
    /// `value`, keeping the position of the first occurrence. The header is
    /// appended when absent. The value is stored verbatim.
    ///
    /// The cached [`raw`](Self::raw) field is **not** updated automatically,
    /// call [`rebuild`](Self::rebuild) once after all header modifications
    /// are done (e.g. after running a transformer pipeline).
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.headers[index].1 = value.to_string();
                let mut i = index + 1;
                while i < self.headers.len() {
                    if self.headers[i].0.eq_ignore_ascii_case(name) {
                        self.headers.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Removes every occurrence of `name` (case-insensitive). Removing an
    /// absent header is a no-op.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Rebuilds the cached [`raw`](Self::raw) field from
    /// [`headers`](Self::headers) and [`body`](Self::body).
    ///
    /// Header lines are emitted with CRLF endings; the body bytes are
    /// appended untouched after the blank separator line.
    pub fn rebuild(&mut self) {
        let headers_len: usize = self
            .headers
            .iter()
            .map(|(k, v)| k.len() + 2 + v.len() + 2)
            .sum();

        let capacity = headers_len + if self.headers.is_empty() { 0 } else { 2 } + self.body.len();

        let mut raw = Vec::with_capacity(capacity);

        for (key, value) in &self.headers {
            raw.extend_from_slice(key.as_bytes());
            raw.extend_from_slice(b": ");
            raw.extend_from_slice(value.as_bytes());
            raw.extend_from_slice(b"\r\n");
        }

        if !self.headers.is_empty() {
            raw.extend_from_slice(b"\r\n");
        }

        raw.extend_from_slice(&self.body);

        self.raw = raw;
    }
}
