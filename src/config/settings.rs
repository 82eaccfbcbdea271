//! Application settings and configuration types.
//!
//! Settings are persisted to `~/.config/mailnote/settings.json` (or XDG
//! equivalent) and loaded at the start of every run. Unknown fields are
//! ignored and missing fields take their defaults, so the file survives
//! version skew in both directions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mail server connection settings.
    pub mail: MailSettings,
    /// Import matching and destination settings.
    pub import: ImportSettings,
    /// Note store (Joplin data API) settings.
    pub api: ApiSettings,
}

/// IMAP connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// IMAP login username (the mail address).
    pub address: String,
    /// IMAP login secret.
    pub password: String,
    /// Mail server address.
    pub imap_host: String,
    /// Mail server port.
    pub imap_port: u16,
    /// Whether to use encrypted transport.
    pub use_tls: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            address: String::new(),
            password: String::new(),
            imap_host: String::new(),
            imap_port: 993,
            use_tls: true,
        }
    }
}

/// What to import and where to put it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Substring a message's subject must contain to be imported.
    pub subject_filter: String,
    /// Name of the notebook to resolve and import into.
    pub notebook_name: String,
}

/// Joplin data API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the data API.
    pub base_url: String,
    /// Authorization token issued by the note application.
    pub token: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:41184".to_string(),
            token: String::new(),
        }
    }
}

/// Validated per-run import configuration.
///
/// Constructed once per run from [`Settings`] via
/// [`Settings::import_config`]; existence of a value implies every required
/// field was present.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// IMAP login username.
    pub mail_address: String,
    /// IMAP login secret.
    pub mail_password: String,
    /// Mail server address.
    pub imap_host: String,
    /// Mail server port.
    pub imap_port: u16,
    /// Whether to use encrypted transport.
    pub use_tls: bool,
    /// Substring a subject must contain to be imported.
    pub subject_filter: String,
    /// Name of the target notebook.
    pub notebook_name: String,
}

impl Settings {
    /// Returns the default on-disk location of the settings file.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mailnote")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file
    /// is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading settings from {}", path.display()))
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing settings from {}", path.display()))
    }

    /// Writes settings to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("writing settings to {}", path.display()))
    }

    /// Validates the settings and builds the per-run [`ImportConfig`].
    ///
    /// Required fields are every string consumed by a scan plus the API
    /// token, and a positive IMAP port. On failure the error lists the
    /// names of the missing or invalid fields; that list feeds the
    /// configuration diagnostic note verbatim.
    pub fn import_config(&self) -> Result<ImportConfig, Vec<&'static str>> {
        let mut missing = Vec::new();

        if self.mail.address.is_empty() {
            missing.push("mail address");
        }
        if self.mail.password.is_empty() {
            missing.push("mail password");
        }
        if self.mail.imap_host.is_empty() {
            missing.push("imap host");
        }
        if self.mail.imap_port == 0 {
            missing.push("imap port");
        }
        if self.import.subject_filter.is_empty() {
            missing.push("subject filter");
        }
        if self.import.notebook_name.is_empty() {
            missing.push("notebook name");
        }
        if self.api.token.is_empty() {
            missing.push("api token");
        }

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ImportConfig {
            mail_address: self.mail.address.clone(),
            mail_password: self.mail.password.clone(),
            imap_host: self.mail.imap_host.clone(),
            imap_port: self.mail.imap_port,
            use_tls: self.mail.use_tls,
            subject_filter: self.import.subject_filter.clone(),
            notebook_name: self.import.notebook_name.clone(),
        })
    }
}
