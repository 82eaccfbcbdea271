//! Integration tests for the import pipeline's public surface.
//!
//! These tests verify that domain types, configuration validation, and the
//! title/escaping rules work correctly across module boundaries. The
//! import service module contains its own scenario tests against in-memory
//! collaborators.

use mailnote::config::Settings;
use mailnote::domain::{resolve_notebook, MailMessage, MessageUid, Notebook, NotebookId};
use mailnote::services::escape_html;

fn notebook(id: &str, name: &str) -> Notebook {
    Notebook {
        id: NotebookId::from(id),
        name: name.to_string(),
    }
}

// ============================================================================
// Title derivation
// ============================================================================

#[test]
fn title_derivation_removes_first_filter_occurrence() {
    let message = MailMessage {
        uid: MessageUid(1),
        subject: "[TODO] buy milk".to_string(),
        body_text: "get milk".to_string(),
    };

    assert!(message.matches_filter("[TODO]"));
    assert_eq!(message.title_without_filter("[TODO]"), " buy milk");
}

#[test]
fn title_derivation_with_escaping() {
    let message = MailMessage {
        uid: MessageUid(1),
        subject: "[TODO] a <tagged> title".to_string(),
        body_text: String::new(),
    };

    let title = escape_html(&message.title_without_filter("[TODO]"));
    assert_eq!(title, " a &lt;tagged&gt; title");
}

#[test]
fn filter_anywhere_in_subject_matches() {
    let message = MailMessage {
        uid: MessageUid(1),
        subject: "Re: [TODO] follow up".to_string(),
        body_text: String::new(),
    };

    assert!(message.matches_filter("[TODO]"));
}

#[test]
fn filter_is_case_sensitive() {
    let message = MailMessage {
        uid: MessageUid(1),
        subject: "[todo] lower case".to_string(),
        body_text: String::new(),
    };

    assert!(!message.matches_filter("[TODO]"));
}

// ============================================================================
// Notebook resolution
// ============================================================================

#[test]
fn notebook_resolution_first_match_wins() {
    let notebooks = vec![
        notebook("first", "Inbox"),
        notebook("second", "Inbox"),
        notebook("other", "Work"),
    ];

    assert_eq!(
        resolve_notebook(&notebooks, "Inbox"),
        NotebookId::from("first")
    );
}

#[test]
fn notebook_resolution_without_match_is_sentinel() {
    let notebooks = vec![notebook("a", "Work")];

    let resolved = resolve_notebook(&notebooks, "Inbox");
    assert!(resolved.is_empty());
}

// ============================================================================
// Configuration validation
// ============================================================================

#[test]
fn default_settings_are_incomplete() {
    let err = Settings::default().import_config().unwrap_err();
    assert!(err.contains(&"mail address"));
    assert!(err.contains(&"subject filter"));
    assert!(err.contains(&"api token"));
}

#[test]
fn complete_settings_validate() {
    let mut settings = Settings::default();
    settings.mail.address = "user@example.com".to_string();
    settings.mail.password = "secret".to_string();
    settings.mail.imap_host = "imap.example.com".to_string();
    settings.import.subject_filter = "[TODO]".to_string();
    settings.import.notebook_name = "Inbox".to_string();
    settings.api.token = "t0ken".to_string();

    let config = settings.import_config().unwrap();
    assert_eq!(config.imap_port, 993);
    assert!(config.use_tls);
}

// ============================================================================
// HTML escaping
// ============================================================================

#[test]
fn escaping_is_idempotent_on_clean_text() {
    let text = "no special characters here";
    assert_eq!(escape_html(text), text);
}

#[test]
fn escaping_handles_all_metacharacters() {
    assert_eq!(escape_html("&"), "&amp;");
    assert_eq!(escape_html("<"), "&lt;");
    assert_eq!(escape_html(">"), "&gt;");
    assert_eq!(escape_html("\""), "&quot;");
    assert_eq!(escape_html("'"), "&#039;");
}
