//! mailnote - Entry point for the mailbox importer
//!
//! Loads settings, wires the IMAP and Joplin adapters into the import
//! service, and runs one scan.

use std::sync::Arc;

use anyhow::{Context, Result};

use mailnote::config::Settings;
use mailnote::providers::mail::{ImapConfig, ImapMailSource};
use mailnote::providers::notes::JoplinNoteStore;
use mailnote::services::{ImportReport, ImportService};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting mailnote");

    match run().await {
        Ok(report) if report.is_success() => {
            tracing::info!(
                created = report.created,
                skipped = report.skipped,
                duration_ms = report.duration_ms,
                "import finished"
            );
        }
        Ok(report) => {
            tracing::error!(
                reason = report.fatal.as_deref().unwrap_or(""),
                "import ended with an error"
            );
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Application error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<ImportReport> {
    let path = Settings::config_path().context("no config directory available")?;
    let settings = Settings::load(&path)?;

    let store = JoplinNoteStore::new(&settings.api.base_url, settings.api.token.clone())?;
    let mail = ImapMailSource::new(ImapConfig {
        host: settings.mail.imap_host.clone(),
        port: settings.mail.imap_port,
        use_tls: settings.mail.use_tls,
        username: settings.mail.address.clone(),
        password: settings.mail.password.clone(),
    });

    let service = ImportService::new(mail, Arc::new(store));
    Ok(service.run(&settings).await)
}
