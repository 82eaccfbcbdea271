//! Joplin data API note store implementation.
//!
//! Joplin's clipper service exposes a local HTTP API (by default on
//! `http://localhost:41184`) for listing folders and creating notes. This
//! module implements [`NoteStore`] against it.
//!
//! Folder listing is paginated; pages are concatenated in API order, which
//! is the order notebook-name resolution observes. The API token
//! authenticates every request as a query parameter and is never logged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{NoteStore, NoteStoreError, Result};
use crate::domain::{NewNote, Notebook, NotebookId, NoteId};

/// Joplin data API client.
pub struct JoplinNoteStore {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

/// One page of the `GET /folders` response.
#[derive(Debug, Deserialize)]
struct FolderPage {
    items: Vec<FolderItem>,
    #[serde(default)]
    has_more: bool,
}

/// A folder as listed by the data API.
#[derive(Debug, Deserialize)]
struct FolderItem {
    id: String,
    title: String,
}

/// Request body for `POST /notes`.
#[derive(Debug, Serialize)]
struct NotePayload<'a> {
    title: &'a str,
    body: &'a str,
    parent_id: &'a str,
}

/// Response body for `POST /notes`.
#[derive(Debug, Deserialize)]
struct CreatedNote {
    id: String,
}

impl JoplinNoteStore {
    /// Creates a client for the data API at `base_url`, authenticating
    /// with `token`.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| NoteStoreError::BaseUrl(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| NoteStoreError::BaseUrl(e.to_string()))
    }

    /// Maps a non-success response to [`NoteStoreError::Api`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoteStoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl NoteStore for JoplinNoteStore {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        let endpoint = self.endpoint("folders")?;
        let mut notebooks = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let response = self
                .client
                .get(endpoint.clone())
                .query(&[
                    ("token", self.token.as_str()),
                    ("fields", "id,title"),
                    ("page", page_param.as_str()),
                ])
                .send()
                .await
                .map_err(|e| NoteStoreError::Http(e.to_string()))?;

            let folder_page: FolderPage = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| NoteStoreError::Decode(e.to_string()))?;

            notebooks.extend(folder_page.items.into_iter().map(|item| Notebook {
                id: NotebookId(item.id),
                name: item.title,
            }));

            if !folder_page.has_more {
                break;
            }
            page += 1;
        }

        tracing::debug!(count = notebooks.len(), "listed notebooks");
        Ok(notebooks)
    }

    async fn create_note(&self, note: &NewNote) -> Result<NoteId> {
        let endpoint = self.endpoint("notes")?;

        let response = self
            .client
            .post(endpoint)
            .query(&[("token", self.token.as_str())])
            .json(&NotePayload {
                title: &note.title,
                body: &note.body,
                parent_id: &note.parent_id.0,
            })
            .send()
            .await
            .map_err(|e| NoteStoreError::Http(e.to_string()))?;

        let created: CreatedNote = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| NoteStoreError::Decode(e.to_string()))?;

        tracing::debug!(note_id = %created.id, "created note");
        Ok(NoteId(created.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        let result = JoplinNoteStore::new("not a url", "token");
        assert!(matches!(result, Err(NoteStoreError::BaseUrl(_))));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let store = JoplinNoteStore::new("http://localhost:41184", "token").unwrap();
        let url = store.endpoint("folders").unwrap();
        assert_eq!(url.as_str(), "http://localhost:41184/folders");
    }

    #[test]
    fn note_payload_serialization() {
        let payload = NotePayload {
            title: "a title",
            body: "a body",
            parent_id: "nb-1",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "a title",
                "body": "a body",
                "parent_id": "nb-1",
            })
        );
    }

    #[test]
    fn folder_page_deserialization() {
        let page: FolderPage = serde_json::from_str(
            r#"{"items": [{"id": "abc", "title": "Inbox", "parent_id": ""}], "has_more": true}"#,
        )
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Inbox");
        assert!(page.has_more);
    }

    #[test]
    fn folder_page_has_more_defaults_false() {
        let page: FolderPage = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(!page.has_more);
    }
}
