//! Content fingerprinting for duplicate suppression
//!
//! Documentation sites serve the same page under several URLs (language
//! switchers, trailing variants, query aliases). The ledger remembers a
//! SHA-256 fingerprint of every text that was persisted so the second copy
//! is never written.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

/// SHA-256 digest of a persisted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    pub fn of(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        Self(digest.into())
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Set of fingerprints seen during one crawl run
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<ContentFingerprint>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `content` was already recorded
    ///
    /// New content is recorded as a side effect, so the first call for a
    /// given text returns false and every later call returns true.
    pub fn is_duplicate(&mut self, content: &str) -> bool {
        let fingerprint = ContentFingerprint::of(content);
        let duplicate = !self.seen.insert(fingerprint);
        if duplicate {
            tracing::debug!("Duplicate content fingerprint {}", fingerprint);
        }
        duplicate
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
