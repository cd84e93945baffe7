//! Durable, searchable collection of saved explanations.
//!
//! The store persists as a single JSON array blob under one well-known file
//! and rewrites the whole blob after every mutation. Loading is best-effort:
//! malformed blobs become an empty store, malformed entries are repaired or
//! dropped individually.

mod persist;
pub mod store;

pub use store::NotesStore;
