//! Note and notebook domain types.
//!
//! Notebooks are the containers notes are created in; a note is always
//! created inside exactly one notebook.

use serde::{Deserialize, Serialize};

use super::NotebookId;

/// A notebook as listed by the note store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Opaque store-assigned identifier.
    pub id: NotebookId,
    /// Human-readable name, as shown in the note application.
    pub name: String,
}

/// A note to be created in the store.
///
/// Ownership passes to the store on creation; the importer never reads a
/// note back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    /// Note title.
    pub title: String,
    /// Note body.
    pub body: String,
    /// Notebook the note is created in. May be the empty sentinel, in which
    /// case the store decides whether the note is unparented or rejected.
    pub parent_id: NotebookId,
}

impl NewNote {
    /// Creates a note from already-escaped title and body text.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        parent_id: NotebookId,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            parent_id,
        }
    }
}

/// Resolves a notebook name to its identifier by linear search.
///
/// Matching is exact and case-sensitive; the first match in listing order
/// wins. Zero matches resolve to the empty sentinel [`NotebookId`].
pub fn resolve_notebook(notebooks: &[Notebook], name: &str) -> NotebookId {
    notebooks
        .iter()
        .find(|n| n.name == name)
        .map(|n| n.id.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook(id: &str, name: &str) -> Notebook {
        Notebook {
            id: NotebookId::from(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn resolve_exact_match() {
        let books = vec![notebook("a", "Work"), notebook("b", "Inbox")];
        assert_eq!(resolve_notebook(&books, "Inbox"), NotebookId::from("b"));
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let books = vec![notebook("a", "Inbox")];
        assert!(resolve_notebook(&books, "inbox").is_empty());
    }

    #[test]
    fn resolve_first_match_wins() {
        let books = vec![notebook("a", "Inbox"), notebook("b", "Inbox")];
        assert_eq!(resolve_notebook(&books, "Inbox"), NotebookId::from("a"));
    }

    #[test]
    fn resolve_no_match_is_sentinel() {
        let books = vec![notebook("a", "Work")];
        assert!(resolve_notebook(&books, "Missing").is_empty());
    }

    #[test]
    fn note_serialization() {
        let note = NewNote::new("title", "body", NotebookId::from("nb-1"));
        let json = serde_json::to_string(&note).unwrap();
        let deserialized: NewNote = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.title, "title");
        assert_eq!(deserialized.parent_id, NotebookId::from("nb-1"));
    }
}
