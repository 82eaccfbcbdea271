//! External collaborator adapters.
//!
//! The importer consumes two opaque capabilities, each behind a trait with
//! one production implementation:
//!
//! - [`mail`]: the mailbox being scanned (IMAP)
//! - [`notes`]: the note application notes are created in (Joplin)

pub mod mail;
pub mod notes;
