//! mailnote - imports flagged emails from an IMAP mailbox into notebook notes
//!
//! This crate provides the core functionality for the mailnote importer:
//! the mailbox-scan-and-import procedure, its configuration layer, and the
//! IMAP and Joplin adapters it runs against.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
