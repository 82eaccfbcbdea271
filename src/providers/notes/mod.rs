//! Note store implementations.
//!
//! This module contains the [`NoteStore`] trait and its Joplin data API
//! implementation: list notebooks, create notes.

mod joplin;
mod traits;

pub use joplin::JoplinNoteStore;
pub use traits::{NoteStore, NoteStoreError, Result};
