//! Message identity generation for duplicated copies.
//!
//! Every copy needs a fresh `Message-ID` (the downstream deduplication key)
//! and a short random subject tag (the human-visible distinguisher). Both
//! generators live here so that the randomness and host-identity inputs are
//! explicit collaborators rather than ambient globals.

use chrono::Utc;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use uuid::Uuid;

/// Length of the random subject tag appended to every copy.
pub const DEFAULT_TAG_LENGTH: usize = 4;

/// Number of random hex characters in a generated Message-ID (48 bits).
const TOKEN_LENGTH: usize = 12;

/// Source of fresh RFC 5322 `Message-ID` values.
///
/// Generated identifiers have the form `<timestamp.token@domain>`: a
/// seconds-resolution Unix timestamp, a random 48-bit hex token, and the
/// configured domain. The token makes collisions across a batch a
/// non-concern; the values are operationally unique, not cryptographically
/// unpredictable.
#[derive(Debug, Clone)]
pub struct MessageIdSource {
    domain: String,
}

impl MessageIdSource {
    /// Creates a source that stamps identifiers with the given domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Creates a source using the local machine's hostname, falling back to
    /// `localhost` when the hostname is not representable.
    pub fn local_host() -> Self {
        let domain = gethostname::gethostname()
            .to_str()
            .unwrap_or("localhost")
            .to_string();
        Self::new(domain)
    }

    /// Returns the domain identifiers are stamped with.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Generates a fresh identifier stamped with the current time.
    pub fn generate(&self) -> String {
        self.generate_at(Utc::now().timestamp())
    }

    /// Generates a fresh identifier stamped with an explicit timestamp.
    ///
    /// The timestamp is the only deterministic component; the token is
    /// drawn anew on every call.
    pub fn generate_at(&self, timestamp: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!("<{}.{}@{}>", timestamp, &token[..TOKEN_LENGTH], self.domain)
    }
}

/// Returns a random alphanumeric tag of the given length.
///
/// Drawn uniformly from `[A-Za-z0-9]`. Used for subject disambiguation
/// only; the `Message-ID` is the authoritative uniqueness guarantee.
pub fn random_tag(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
