//! Mail message domain types.
//!
//! Represents a fetched email in the form the importer consumes: just the
//! fields that drive matching and note creation, decoded from the raw
//! RFC 5322 bytes by the mail source adapter.

use serde::{Deserialize, Serialize};

use super::MessageUid;

/// A decoded email message, independent of any mail client library.
///
/// Created once per fetched message, consumed to produce at most one note,
/// then discarded. A message with no subject or no plain-text part carries
/// the empty string for that field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    /// Server-assigned UID, used to address the seen-flag mutation.
    pub uid: MessageUid,
    /// Decoded subject line.
    pub subject: String,
    /// Decoded plain-text body.
    pub body_text: String,
}

impl MailMessage {
    /// Returns true if the subject contains `filter` as a substring.
    ///
    /// Matching is case-sensitive and not anchored: the filter may appear
    /// anywhere in the subject.
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.subject.contains(filter)
    }

    /// Derives the note title from the subject by removing the first
    /// occurrence of `filter`. The caller is responsible for escaping.
    pub fn title_without_filter(&self, filter: &str) -> String {
        self.subject.replacen(filter, "", 1)
    }
}
