//! Backend transport seam.
//!
//! The explanation backend is an external collaborator reached over HTTP.
//! All consumers go through the [`Backend`] trait so the request controller
//! and the export pipeline are testable with an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use curiomind_core::types::{Age, AnswerLength, ExportFormat, LanguageCode, RelatedQuestions};

/// Failure of a single backend exchange.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

/// Request body for `POST /explain`.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainRequest {
    pub question: String,
    pub age: Age,
    pub length: AnswerLength,
    pub language: LanguageCode,
}

/// Parsed response from `POST /explain`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainResponse {
    pub answer: String,
    pub related: RelatedQuestions,
}

impl ExplainResponse {
    /// Parse a JSON body tolerantly.
    ///
    /// `answer` is required; a body without it is malformed. `related` may be
    /// missing or of the wrong shape, in which case it is treated as empty,
    /// and is truncated to the maximum either way.
    pub fn from_body(body: &Value) -> Result<Self, BackendError> {
        let answer = body
            .get("answer")
            .and_then(Value::as_str)
            .ok_or_else(|| BackendError::MalformedBody("missing `answer` field".to_string()))?
            .to_string();

        let related = body
            .get("related")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            answer,
            related: RelatedQuestions::truncated(related),
        })
    }
}

/// Contract the core depends on from the remote backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /explain` — generate an explanation for one question.
    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse, BackendError>;

    /// `GET /export?format=...` — fetch a server-rendered document.
    async fn fetch_export(&self, format: ExportFormat) -> Result<Vec<u8>, BackendError>;

    /// `POST /notes/add` — best-effort notification that a note was saved
    /// locally. Callers swallow the error; the local add already succeeded.
    async fn notify_note_added(
        &self,
        question: &str,
        explanation: &str,
    ) -> Result<(), BackendError>;
}

/// HTTP implementation of [`Backend`] over a shared reqwest client.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a backend with a per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse, BackendError> {
        let response = self
            .client
            .post(self.url("/explain"))
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedBody(e.to_string()))?;
        ExplainResponse::from_body(&body)
    }

    async fn fetch_export(&self, format: ExportFormat) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .get(self.url("/export"))
            .query(&[("format", format.as_str())])
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn notify_note_added(
        &self,
        question: &str,
        explanation: &str,
    ) -> Result<(), BackendError> {
        let body = serde_json::json!({
            "question": question,
            "explanation": explanation,
        });

        let response = self
            .client
            .post(self.url("/notes/add"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
