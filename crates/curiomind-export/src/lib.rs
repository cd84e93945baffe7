//! Multi-format export of the notes collection.
//!
//! The pipeline always tries the backend's pre-rendered document first. PDF
//! has no client-side fallback; DOCX falls back to a locally synthesized
//! legacy `.doc` file when the backend path fails and there is anything to
//! export.

pub mod doc;
pub mod pipeline;

pub use doc::{escape_doc_text, synthesize_fallback_doc};
pub use pipeline::{ExportError, ExportPipeline, ExportedDocument};
