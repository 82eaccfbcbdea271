//! Business services layer.
//!
//! This module contains the service that orchestrates the import logic,
//! coordinating between the configuration layer and the provider adapters:
//!
//! - [`ImportService`]: runs one mailbox scan and turns matching messages
//!   into notes

mod import_service;

pub use import_service::{escape_html, ImportReport, ImportService};
