//! Mail source implementations.
//!
//! This module contains the [`MailSource`] trait and its IMAP
//! implementation. The trait covers exactly the operations one scan needs:
//! connect, search-and-fetch unseen mail, flag seen, disconnect.

mod imap;
mod traits;

pub use imap::{ImapConfig, ImapMailSource};
pub use traits::{MailError, MailSource, Result};
