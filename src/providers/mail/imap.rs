//! IMAP mail source implementation.
//!
//! This module provides a [`MailSource`] implementation over IMAP4rev1
//! (RFC 3501) via `async-imap`, with rustls for encrypted transport and
//! `mail-parser` for MIME decoding.
//!
//! The connection uses direct TLS when configured (typically port 993) and
//! plain TCP otherwise. Both stream shapes are erased behind a boxed
//! [`SessionStream`] so a single session type serves either transport.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use mail_parser::MessageParser;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::{MailError, MailSource, Result};
use crate::domain::{MailMessage, MessageUid};

/// Transport stream the IMAP session runs over, TLS or plain.
pub trait SessionStream:
    futures::io::AsyncRead + futures::io::AsyncWrite + Unpin + Send + Sync + fmt::Debug
{
}

impl<T> SessionStream for T where
    T: futures::io::AsyncRead + futures::io::AsyncWrite + Unpin + Send + Sync + fmt::Debug
{
}

type ImapSession = async_imap::Session<Box<dyn SessionStream>>;

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct ImapConfig {
    /// Mail server hostname.
    pub host: String,
    /// Mail server port (typically 993 for TLS, 143 for plain).
    pub port: u16,
    /// Whether to use encrypted transport.
    pub use_tls: bool,
    /// Login username.
    pub username: String,
    /// Login secret.
    pub password: String,
}

/// IMAP-backed mail source.
///
/// Holds at most one server session; [`connect`](MailSource::connect)
/// establishes it and [`disconnect`](MailSource::disconnect) tears it down.
pub struct ImapMailSource {
    config: ImapConfig,
    session: Option<ImapSession>,
}

impl ImapMailSource {
    /// Creates a mail source for the given server. No I/O happens until
    /// [`connect`](MailSource::connect).
    pub fn new(config: ImapConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Returns whether a session is currently open.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn session_mut(&mut self) -> Result<&mut ImapSession> {
        self.session.as_mut().ok_or(MailError::NotConnected)
    }

    /// Establishes the transport stream, with a TLS handshake iff
    /// configured.
    async fn connect_stream(&self) -> Result<Box<dyn SessionStream>> {
        let tcp = TcpStream::connect((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| MailError::Connection(format!("TCP connect failed: {}", e)))?;

        if !self.config.use_tls {
            return Ok(Box::new(tcp.compat()));
        }

        let tls_config = ClientConfig::builder()
            .with_root_certificates(RootCertStore::from_iter(
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
            ))
            .with_no_client_auth();

        let connector = TlsConnector::from(Arc::new(tls_config));
        let server_name = ServerName::try_from(self.config.host.clone())
            .map_err(|e| MailError::Tls(format!("invalid server name: {}", e)))?;

        let tls_stream = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| MailError::Tls(format!("TLS handshake failed: {}", e)))?;

        Ok(Box::new(tls_stream.compat()))
    }

    /// Consumes a response stream to completion.
    async fn drain_stream<T, E>(
        stream: impl futures::Stream<Item = std::result::Result<T, E>>,
    ) -> std::result::Result<(), E> {
        futures::pin_mut!(stream);
        while let Some(result) = stream.next().await {
            result?;
        }
        Ok(())
    }
}

/// Builds the search criteria for unseen messages received since `since`.
///
/// IMAP `SINCE` takes a date with no time component, `dd-Mon-yyyy`.
fn search_query(since: DateTime<Utc>) -> String {
    format!("UNSEEN SINCE {}", since.format("%d-%b-%Y"))
}

/// Decodes raw RFC 5322 bytes into the importer's message representation.
///
/// A message that fails MIME parsing entirely yields `None`; a parsed
/// message with no subject or no plain-text part carries the empty string
/// for that field.
fn decode_mail(uid: u32, raw: &[u8]) -> Option<MailMessage> {
    let parsed = MessageParser::default().parse(raw)?;

    let subject = parsed.subject().unwrap_or_default().to_string();
    let body_text = parsed
        .body_text(0)
        .map(|s| s.to_string())
        .unwrap_or_default();

    Some(MailMessage {
        uid: MessageUid(uid),
        subject,
        body_text,
    })
}

#[async_trait]
impl MailSource for ImapMailSource {
    async fn connect(&mut self) -> Result<()> {
        let stream = self.connect_stream().await?;

        let client = async_imap::Client::new(stream);
        let mut session = client
            .login(&self.config.username, &self.config.password)
            .await
            .map_err(|(e, _)| MailError::Auth(e.to_string()))?;

        // SELECT, not EXAMINE: flag updates must be permitted.
        session
            .select("INBOX")
            .await
            .map_err(|e| MailError::Imap(e.to_string()))?;

        tracing::debug!(host = %self.config.host, "IMAP session established");
        self.session = Some(session);
        Ok(())
    }

    async fn fetch_unseen_since(&mut self, since: DateTime<Utc>) -> Result<Vec<MailMessage>> {
        let session = self.session_mut()?;

        let query = search_query(since);
        let uids = session
            .uid_search(&query)
            .await
            .map_err(|e| MailError::Imap(e.to_string()))?;

        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();

        if uid_list.is_empty() {
            return Ok(Vec::new());
        }

        let uid_seq = uid_list
            .iter()
            .map(|u| u.to_string())
            .collect::<Vec<_>>()
            .join(",");

        // PEEK keeps the server from setting \Seen as a fetch side effect;
        // the flag is added explicitly per message after processing.
        let fetch_stream = session
            .uid_fetch(&uid_seq, "(UID BODY.PEEK[])")
            .await
            .map_err(|e| MailError::Imap(e.to_string()))?;
        let fetches: Vec<_> = fetch_stream.collect().await;

        let mut messages = Vec::new();
        for fetch_result in fetches {
            let fetch = fetch_result.map_err(|e| MailError::Imap(e.to_string()))?;

            let (Some(uid), Some(body)) = (fetch.uid, fetch.body()) else {
                tracing::warn!("fetch item without UID or body, skipping");
                continue;
            };

            match decode_mail(uid, body) {
                Some(message) => messages.push(message),
                None => tracing::warn!(uid, "message failed MIME decoding, skipping"),
            }
        }

        Ok(messages)
    }

    async fn mark_seen(&mut self, uid: MessageUid) -> Result<()> {
        let session = self.session_mut()?;

        let store_stream = session
            .uid_store(uid.to_string(), "+FLAGS (\\Seen)")
            .await
            .map_err(|e| MailError::Imap(e.to_string()))?;
        Self::drain_stream(store_stream)
            .await
            .map_err(|e| MailError::Imap(e.to_string()))?;

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.logout().await {
                tracing::warn!("logout failed: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config() -> ImapConfig {
        ImapConfig {
            host: "imap.example.com".to_string(),
            port: 993,
            use_tls: true,
            username: "user@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn search_query_date_format() {
        let since = Utc.with_ymd_and_hms(2024, 3, 7, 15, 30, 0).unwrap();
        assert_eq!(search_query(since), "UNSEEN SINCE 07-Mar-2024");
    }

    #[test]
    fn decode_mail_extracts_subject_and_text() {
        let raw = b"Subject: [TODO] buy milk\r\n\
            From: sender@example.com\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            get milk\r\n";

        let message = decode_mail(7, raw).unwrap();
        assert_eq!(message.uid, MessageUid(7));
        assert_eq!(message.subject, "[TODO] buy milk");
        assert_eq!(message.body_text.trim_end(), "get milk");
    }

    #[test]
    fn decode_mail_missing_subject_is_empty() {
        let raw = b"From: sender@example.com\r\n\r\nbody only\r\n";

        let message = decode_mail(1, raw).unwrap();
        assert_eq!(message.subject, "");
        assert_eq!(message.body_text.trim_end(), "body only");
    }

    #[test]
    fn new_source_is_disconnected() {
        let source = ImapMailSource::new(test_config());
        assert!(!source.is_connected());
    }

    #[tokio::test]
    async fn operations_require_connect() {
        let mut source = ImapMailSource::new(test_config());

        let result = source.fetch_unseen_since(Utc::now()).await;
        assert!(matches!(result, Err(MailError::NotConnected)));

        let result = source.mark_seen(MessageUid(1)).await;
        assert!(matches!(result, Err(MailError::NotConnected)));
    }

    #[tokio::test]
    async fn disconnect_without_session_is_ok() {
        let mut source = ImapMailSource::new(test_config());
        assert!(source.disconnect().await.is_ok());
    }
}
