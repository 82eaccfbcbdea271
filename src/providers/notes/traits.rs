//! Note store trait definition.
//!
//! This module defines the [`NoteStore`] trait which abstracts over the
//! note application the importer writes into. The production
//! implementation talks to the Joplin data API
//! ([`JoplinNoteStore`](super::JoplinNoteStore)); tests substitute
//! in-memory fakes.

use async_trait::async_trait;

use crate::domain::{NewNote, Notebook, NoteId};

/// Result type alias for note store operations.
pub type Result<T> = std::result::Result<T, NoteStoreError>;

/// Errors that can occur against the note store.
#[derive(Debug, thiserror::Error)]
pub enum NoteStoreError {
    /// Transport-level failure reaching the store.
    #[error("http error: {0}")]
    Http(String),

    /// The store answered with a non-success status.
    #[error("api error (status {status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the store.
        body: String,
    },

    /// The store answered with a payload that did not decode.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The configured base URL is not a valid URL.
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

/// Trait for the note application notes are created in.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Lists all notebooks, in the store's own listing order.
    ///
    /// That order is load-bearing: notebook-name resolution is
    /// first-match-wins over exactly this sequence.
    async fn list_notebooks(&self) -> Result<Vec<Notebook>>;

    /// Creates a note; ownership passes to the store. The parent notebook
    /// may be the empty sentinel, in which case the store decides whether
    /// the note is unparented or rejected.
    async fn create_note(&self, note: &NewNote) -> Result<NoteId>;
}
