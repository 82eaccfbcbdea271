//! Mail source trait definition.
//!
//! This module defines the [`MailSource`] trait which abstracts over the
//! mail backend the importer scans. The production implementation is IMAP
//! ([`ImapMailSource`](super::ImapMailSource)); tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{MailMessage, MessageUid};

/// Result type alias for mail source operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Errors that can occur while talking to the mail server.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Network-level connection failure.
    #[error("connection failed: {0}")]
    Connection(String),

    /// TLS handshake or certificate failure.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Login was rejected by the server.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Protocol error from a search, fetch, or store command.
    #[error("IMAP error: {0}")]
    Imap(String),

    /// An operation was attempted before [`MailSource::connect`].
    #[error("not connected")]
    NotConnected,
}

/// Trait for the mailbox the importer scans.
///
/// The expected call sequence per scan is `connect`, then
/// `fetch_unseen_since`, then zero or more `mark_seen`, ending with
/// `disconnect`.
/// Implementations own at most one server session at a time.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Opens the connection, authenticates, and opens the inbox in
    /// read-write mode so later flag updates are permitted.
    async fn connect(&mut self) -> Result<()>;

    /// Searches for unseen messages received since `since` and fetches
    /// each one's full raw body, decoded into [`MailMessage`]s.
    ///
    /// Fetching must not itself mark messages seen; the seen flag is only
    /// mutated by [`mark_seen`](Self::mark_seen).
    async fn fetch_unseen_since(&mut self, since: DateTime<Utc>) -> Result<Vec<MailMessage>>;

    /// Adds the seen flag to one message. Idempotent on the server side.
    async fn mark_seen(&mut self, uid: MessageUid) -> Result<()>;

    /// Logs out and drops the session. Safe to call when not connected.
    async fn disconnect(&mut self) -> Result<()>;
}
