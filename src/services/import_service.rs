//! Import service for the mailbox scan.
//!
//! The [`ImportService`] owns one run of the mailbox-scan-and-import
//! procedure: validate configuration, resolve the target notebook, scan the
//! mailbox for unseen messages, create a note per matching message, and
//! mark every fetched message seen.
//!
//! All user-visible behavior goes through notes in the store: on any
//! failure the service creates a best-effort diagnostic note in the target
//! notebook instead of surfacing the error elsewhere. The returned
//! [`ImportReport`] is informational.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{ImportConfig, Settings};
use crate::domain::{resolve_notebook, NewNote, NotebookId};
use crate::providers::mail::MailSource;
use crate::providers::notes::NoteStore;

/// Title of every diagnostic note.
const DIAGNOSTIC_TITLE: &str = "Error";

/// Result of one import run.
///
/// Counts cover the messages the scan actually reached; a run that aborted
/// mid-scan reports the partial tallies together with `fatal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Unseen messages fetched from the mailbox.
    pub fetched: usize,
    /// Notes created from matching messages.
    pub created: usize,
    /// Messages fetched but not matching the subject filter.
    pub skipped: usize,
    /// Messages marked seen on the server.
    pub flagged_seen: usize,
    /// Reason the run ended early, if it did. The same text is what the
    /// diagnostic note carries.
    pub fatal: Option<String>,
    /// Duration of the run.
    pub duration_ms: u64,
}

impl ImportReport {
    /// Returns true if the scan ran to completion.
    pub fn is_success(&self) -> bool {
        self.fatal.is_none()
    }

    fn finish(tally: ScanTally, fatal: Option<String>, started: Instant) -> Self {
        Self {
            fetched: tally.fetched,
            created: tally.created,
            skipped: tally.skipped,
            flagged_seen: tally.flagged_seen,
            fatal,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Running counts for one scan.
#[derive(Debug, Default)]
struct ScanTally {
    fetched: usize,
    created: usize,
    skipped: usize,
    flagged_seen: usize,
}

/// Escapes HTML metacharacters for safe embedding in a note.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Service orchestrating one mailbox scan per [`run`](Self::run) call.
///
/// Generic over its two collaborators so tests can substitute in-memory
/// fakes for the IMAP and Joplin adapters.
pub struct ImportService<M: MailSource, N: NoteStore> {
    mail: Mutex<M>,
    notes: Arc<N>,
}

impl<M: MailSource, N: NoteStore> ImportService<M, N> {
    /// Creates a service over the given mail source and note store.
    pub fn new(mail: M, notes: Arc<N>) -> Self {
        Self {
            mail: Mutex::new(mail),
            notes,
        }
    }

    /// Runs one scan.
    ///
    /// The scan-start timestamp is captured here, once; the search window
    /// is never re-derived mid-run. Configuration problems abort before any
    /// connection is opened; later failures end the scan without retry,
    /// leaving already-created notes in place and remaining messages
    /// unseen. Every abort path leaves one diagnostic note behind
    /// (best-effort).
    pub async fn run(&self, settings: &Settings) -> ImportReport {
        let started = Instant::now();
        let scan_start = Utc::now();

        let config = match settings.import_config() {
            Ok(config) => config,
            Err(missing) => {
                let reason = format!("missing configuration: {}", missing.join(", "));
                tracing::warn!(%reason, "import aborted before connecting");
                self.diagnostic_note(&NotebookId::default(), &reason).await;
                return ImportReport::finish(ScanTally::default(), Some(reason), started);
            }
        };

        let notebook_id = match self.notes.list_notebooks().await {
            Ok(notebooks) => resolve_notebook(&notebooks, &config.notebook_name),
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(%reason, "listing notebooks failed");
                self.diagnostic_note(&NotebookId::default(), &reason).await;
                return ImportReport::finish(ScanTally::default(), Some(reason), started);
            }
        };
        if notebook_id.is_empty() {
            // Not a pre-flight error: the scan proceeds and note creation
            // is left to the store to accept or reject.
            tracing::warn!(
                name = %config.notebook_name,
                "no notebook with that name, notes will be unparented"
            );
        }

        let mut tally = ScanTally::default();
        match self
            .import_unseen(&config, &notebook_id, scan_start, &mut tally)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    fetched = tally.fetched,
                    created = tally.created,
                    skipped = tally.skipped,
                    "scan complete"
                );
                ImportReport::finish(tally, None, started)
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(%reason, "scan failed");
                self.diagnostic_note(&notebook_id, &reason).await;
                ImportReport::finish(tally, Some(reason), started)
            }
        }
    }

    /// Connects, scans, and tears the connection down again.
    ///
    /// The connection is closed on the error path too, mirroring the scan's
    /// short-circuit to `Closing` from any mid-scan failure.
    async fn import_unseen(
        &self,
        config: &ImportConfig,
        notebook_id: &NotebookId,
        scan_start: DateTime<Utc>,
        tally: &mut ScanTally,
    ) -> Result<()> {
        let mut mail = self.mail.lock().await;
        mail.connect().await?;

        let outcome = self
            .scan(&mut *mail, config, notebook_id, scan_start, tally)
            .await;

        if let Err(e) = mail.disconnect().await {
            tracing::warn!("disconnect failed: {}", e);
        }
        outcome
    }

    async fn scan(
        &self,
        mail: &mut M,
        config: &ImportConfig,
        notebook_id: &NotebookId,
        scan_start: DateTime<Utc>,
        tally: &mut ScanTally,
    ) -> Result<()> {
        let messages = mail.fetch_unseen_since(scan_start).await?;
        tally.fetched = messages.len();
        tracing::info!(count = messages.len(), "fetched unseen messages");

        for message in messages {
            if message.matches_filter(&config.subject_filter) {
                let note = NewNote::new(
                    escape_html(&message.title_without_filter(&config.subject_filter)),
                    escape_html(&message.body_text),
                    notebook_id.clone(),
                );
                self.notes.create_note(&note).await?;
                tally.created += 1;
                tracing::debug!(uid = %message.uid, "imported message");
            } else {
                tally.skipped += 1;
                tracing::debug!(uid = %message.uid, "subject does not match filter");
            }

            // Matching and non-matching messages alike are consumed here;
            // a later scan never reconsiders them.
            mail.mark_seen(message.uid).await?;
            tally.flagged_seen += 1;
        }

        Ok(())
    }

    /// Creates a diagnostic note. Best-effort: its own failure is only
    /// logged.
    async fn diagnostic_note(&self, parent: &NotebookId, body: &str) {
        let note = NewNote::new(DIAGNOSTIC_TITLE, body, parent.clone());
        if let Err(e) = self.notes.create_note(&note).await {
            tracing::warn!("failed to create diagnostic note: {}", e);
        }
    }
}
