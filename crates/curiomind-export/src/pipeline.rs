//! Primary/fallback export over the notes collection.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use curiomind_client::Backend;
use curiomind_core::types::ExportFormat;
use curiomind_notes::NotesStore;

use crate::doc::{
    synthesize_fallback_doc, DOCX_FILENAME, DOCX_MEDIA_TYPE, FALLBACK_DOC_FILENAME,
    FALLBACK_DOC_MEDIA_TYPE, PDF_FILENAME, PDF_MEDIA_TYPE,
};

/// Errors the export pipeline can surface to the user.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The backend could not render a PDF. There is no client-side PDF
    /// fallback, so the attempt produces no document.
    #[error("PDF export unavailable: {0}")]
    PdfUnavailable(String),
}

/// A document ready to hand to the user as a file download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    fn new(filename: &str, media_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            media_type: media_type.to_string(),
            bytes,
        }
    }
}

/// Turns the current notes collection into a downloadable document.
///
/// Both formats first ask the backend for a pre-rendered document. On
/// failure, `pdf` is terminal while `docx` falls back to local synthesis
/// from the live store. Export never mutates the store.
pub struct ExportPipeline<B> {
    backend: Arc<B>,
}

impl<B: Backend> ExportPipeline<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Export the store in the requested format.
    ///
    /// Returns `Ok(None)` only for a `docx` export over an empty store,
    /// which skips the network entirely. Every other success path yields a
    /// document.
    pub async fn export(
        &self,
        format: ExportFormat,
        store: &NotesStore,
    ) -> Result<Option<ExportedDocument>, ExportError> {
        if format == ExportFormat::Docx && store.is_empty() {
            info!("Nothing to export; notes collection is empty");
            return Ok(None);
        }

        match self.backend.fetch_export(format).await {
            Ok(bytes) => {
                let document = match format {
                    ExportFormat::Pdf => {
                        ExportedDocument::new(PDF_FILENAME, PDF_MEDIA_TYPE, bytes)
                    }
                    ExportFormat::Docx => {
                        ExportedDocument::new(DOCX_FILENAME, DOCX_MEDIA_TYPE, bytes)
                    }
                };
                info!(
                    format = format.as_str(),
                    size = document.bytes.len(),
                    "Export rendered by backend"
                );
                Ok(Some(document))
            }
            Err(e) => match format {
                ExportFormat::Pdf => Err(ExportError::PdfUnavailable(e.to_string())),
                ExportFormat::Docx => {
                    warn!(error = %e, "Backend DOCX export failed; synthesizing fallback document");
                    let bytes = synthesize_fallback_doc(&store.all());
                    Ok(Some(ExportedDocument::new(
                        FALLBACK_DOC_FILENAME,
                        FALLBACK_DOC_MEDIA_TYPE,
                        bytes,
                    )))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use curiomind_client::{BackendError, ExplainRequest, ExplainResponse};
    use curiomind_core::types::{Age, AnswerLength, Explanation};

    struct FakeBackend {
        export_result: Result<Vec<u8>, u16>,
        export_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn serving(bytes: &[u8]) -> Self {
            Self {
                export_result: Ok(bytes.to_vec()),
                export_calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                export_result: Err(status),
                export_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.export_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn explain(
            &self,
            _request: &ExplainRequest,
        ) -> Result<ExplainResponse, BackendError> {
            unimplemented!("export tests never call explain")
        }

        async fn fetch_export(&self, _format: ExportFormat) -> Result<Vec<u8>, BackendError> {
            self.export_calls.fetch_add(1, Ordering::SeqCst);
            self.export_result
                .clone()
                .map_err(|status| BackendError::Status { status })
        }

        async fn notify_note_added(
            &self,
            _question: &str,
            _explanation: &str,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn store_with_notes(dir: &tempfile::TempDir, count: usize) -> NotesStore {
        let store = NotesStore::open(dir.path().join("notes.json"));
        for i in 0..count {
            store.add(Explanation::new(
                format!("question {i}?"),
                Age::default(),
                AnswerLength::Medium,
                format!("answer {i}"),
            ));
        }
        store
    }

    // ---- Primary path ----

    #[tokio::test]
    async fn test_pdf_primary_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_notes(&dir, 1);
        let backend = Arc::new(FakeBackend::serving(b"%PDF-1.7 fake"));
        let pipeline = ExportPipeline::new(Arc::clone(&backend));

        let doc = pipeline
            .export(ExportFormat::Pdf, &store)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.filename, "curiomindai-notes.pdf");
        assert_eq!(doc.media_type, "application/pdf");
        assert_eq!(doc.bytes, b"%PDF-1.7 fake");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_docx_primary_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_notes(&dir, 2);
        let backend = Arc::new(FakeBackend::serving(b"PK docx bytes"));
        let pipeline = ExportPipeline::new(Arc::clone(&backend));

        let doc = pipeline
            .export(ExportFormat::Docx, &store)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.filename, "curiomindai-notes.docx");
        assert_eq!(
            doc.media_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(doc.bytes, b"PK docx bytes");
    }

    // ---- PDF failure is terminal ----

    #[tokio::test]
    async fn test_pdf_failure_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_notes(&dir, 3);
        let backend = Arc::new(FakeBackend::failing(503));
        let pipeline = ExportPipeline::new(Arc::clone(&backend));

        let err = pipeline
            .export(ExportFormat::Pdf, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::PdfUnavailable(_)));
        assert!(err.to_string().contains("HTTP 503"));
    }

    // ---- DOCX fallback ----

    #[tokio::test]
    async fn test_docx_failure_synthesizes_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::open(dir.path().join("notes.json"));
        store.add(Explanation::new(
            "older?".into(),
            Age::default(),
            AnswerLength::Medium,
            "first saved".into(),
        ));
        store.add(Explanation::new(
            "newer?".into(),
            Age::default(),
            AnswerLength::Medium,
            "second saved".into(),
        ));
        let backend = Arc::new(FakeBackend::failing(500));
        let pipeline = ExportPipeline::new(Arc::clone(&backend));

        let doc = pipeline
            .export(ExportFormat::Docx, &store)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.filename, "curiomindai-notes.doc");
        assert_eq!(doc.media_type, "application/msword");

        // Fallback body follows store order (most recent first).
        let html = String::from_utf8(doc.bytes).unwrap();
        assert!(html.contains("<h3>Q1: newer?</h3>"));
        assert!(html.contains("<h3>Q2: older?</h3>"));
        assert!(html.contains("<p>second saved</p>"));
        assert!(html.contains("<p>first saved</p>"));
    }

    #[tokio::test]
    async fn test_docx_empty_store_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::open(dir.path().join("notes.json"));
        let backend = Arc::new(FakeBackend::failing(500));
        let pipeline = ExportPipeline::new(Arc::clone(&backend));

        let result = pipeline.export(ExportFormat::Docx, &store).await.unwrap();
        assert!(result.is_none());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_pdf_empty_store_still_asks_backend() {
        // Only docx has the empty-store short-circuit.
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::open(dir.path().join("notes.json"));
        let backend = Arc::new(FakeBackend::serving(b"%PDF"));
        let pipeline = ExportPipeline::new(Arc::clone(&backend));

        let doc = pipeline.export(ExportFormat::Pdf, &store).await.unwrap();
        assert!(doc.is_some());
        assert_eq!(backend.calls(), 1);
    }

    // ---- Store is untouched ----

    #[tokio::test]
    async fn test_export_never_mutates_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_notes(&dir, 2);
        let before = store.all();

        let failing = ExportPipeline::new(Arc::new(FakeBackend::failing(500)));
        let _ = failing.export(ExportFormat::Docx, &store).await;
        let _ = failing.export(ExportFormat::Pdf, &store).await;

        let serving = ExportPipeline::new(Arc::new(FakeBackend::serving(b"ok")));
        let _ = serving.export(ExportFormat::Docx, &store).await;

        assert_eq!(store.all(), before);
    }
}
