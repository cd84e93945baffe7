//! Best-effort persistence for the notes blob.
//!
//! One JSON array in one file. Load never fails the caller: an unreadable or
//! malformed blob yields an empty collection, and individual entries are
//! repaired (missing id/createdAt filled, out-of-range age clamped) or
//! dropped when they cannot be coerced into the explanation shape at all.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use curiomind_core::types::{Age, AnswerLength, Explanation, ExplanationId, Timestamp};

/// Persisted entry shape, tolerant of missing identity fields.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredExplanation {
    #[serde(default)]
    id: Option<Uuid>,
    question: String,
    age: u8,
    length: AnswerLength,
    text: String,
    #[serde(default)]
    created_at: Option<i64>,
}

impl StoredExplanation {
    /// Repair into a full explanation: generate a missing id, stamp a
    /// missing creation time, clamp the age into range.
    fn into_explanation(self) -> Explanation {
        Explanation {
            id: self.id.map(ExplanationId).unwrap_or_default(),
            question: self.question,
            age: Age::clamped(self.age),
            length: self.length,
            text: self.text,
            created_at: self.created_at.map(Timestamp).unwrap_or_else(Timestamp::now),
        }
    }
}

/// The single file holding the serialized notes collection.
pub(crate) struct NotesFile {
    path: PathBuf,
}

impl NotesFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted collection, repairing what can be repaired.
    pub(crate) fn load(&self) -> Vec<Explanation> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted notes yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read notes blob; starting empty");
                return Vec::new();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Persisted notes blob is not valid JSON; starting empty");
                return Vec::new();
            }
        };

        let Some(entries) = value.as_array() else {
            warn!("Persisted notes blob is not a sequence; starting empty");
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<StoredExplanation>(entry.clone()) {
                Ok(stored) => Some(stored.into_explanation()),
                Err(e) => {
                    warn!(error = %e, "Dropping note entry that cannot be coerced");
                    None
                }
            })
            .collect()
    }

    /// Re-serialize the entire collection. Write failures are logged and
    /// swallowed; they never interrupt the interactive flow.
    pub(crate) fn save(&self, notes: &[Explanation]) {
        let json = match serde_json::to_string(notes) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize notes; skipping save");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create notes directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "Failed to write notes blob");
        }
    }
}
