//! The notes store: CRUD + search over saved explanations.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::info;

use curiomind_core::types::{Explanation, ExplanationId};

use crate::persist::NotesFile;

/// Durable, user-curated collection of explanations, most-recently-added
/// first.
///
/// All mutations are serialized through the store (single-writer model) and
/// write the full blob through to disk immediately.
pub struct NotesStore {
    notes: Mutex<Vec<Explanation>>,
    file: NotesFile,
}

impl NotesStore {
    /// Open the store backed by the given blob file, loading (and repairing)
    /// whatever is persisted there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let file = NotesFile::new(path);
        let notes = file.load();
        info!(count = notes.len(), "Notes store opened");
        Self {
            notes: Mutex::new(notes),
            file,
        }
    }

    /// Insert an explanation at the front and persist.
    pub fn add(&self, explanation: Explanation) {
        if let Ok(mut notes) = self.notes.lock() {
            notes.insert(0, explanation);
            self.file.save(&notes);
        }
    }

    /// Remove the entry with the given id. Returns whether anything was
    /// removed; a miss is a no-op and does not rewrite the blob.
    pub fn delete(&self, id: ExplanationId) -> bool {
        let Ok(mut notes) = self.notes.lock() else {
            return false;
        };
        let before = notes.len();
        notes.retain(|note| note.id != id);
        let removed = notes.len() != before;
        if removed {
            self.file.save(&notes);
        }
        removed
    }

    /// Empty the collection, but only when the caller has confirmed.
    ///
    /// Without confirmation, or when already empty, nothing changes and
    /// `false` is returned.
    pub fn clear(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let Ok(mut notes) = self.notes.lock() else {
            return false;
        };
        if notes.is_empty() {
            return false;
        }
        notes.clear();
        self.file.save(&notes);
        true
    }

    /// Case-insensitive substring search against question or answer text.
    ///
    /// An empty query returns the full collection unfiltered. Evaluated
    /// fresh against the live collection on every call.
    pub fn search(&self, query: &str) -> Vec<Explanation> {
        let Ok(notes) = self.notes.lock() else {
            return Vec::new();
        };
        if query.is_empty() {
            return notes.clone();
        }
        let needle = query.to_lowercase();
        notes
            .iter()
            .filter(|note| {
                note.question.to_lowercase().contains(&needle)
                    || note.text.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of the full collection, most-recent-first.
    pub fn all(&self) -> Vec<Explanation> {
        self.notes.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.notes.lock().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
