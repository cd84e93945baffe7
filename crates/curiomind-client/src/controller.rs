//! Single-flight explanation request controller.
//!
//! Executes exactly one `/explain` exchange at a time. Accepting a new
//! submit cancels any outstanding exchange; a canceled exchange's eventual
//! settlement is discarded so a stale answer can never overwrite a newer one.

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tracing::debug;

use curiomind_core::types::{Age, AnswerLength, Explanation, LanguageCode};

use crate::backend::{Backend, ExplainRequest};

/// Generation parameters for one submit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskParams {
    pub age: Age,
    pub length: AnswerLength,
    pub language: LanguageCode,
}

/// Result of one submit call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The question was empty after trimming; nothing happened.
    Rejected,
    /// A newer submit replaced this one; its settlement was discarded.
    Superseded,
    /// The exchange settled and its explanation (answer or error-flavored)
    /// is now the current answer.
    Answered(Explanation),
}

/// Visible answer state owned by the controller.
///
/// `generation` identifies the newest accepted submit. Every write to the
/// visible fields happens under this one lock together with a generation
/// check, so a stale exchange can never clobber a newer one's answer.
#[derive(Debug, Default)]
struct AnswerState {
    generation: u64,
    loading: bool,
    current: Option<Explanation>,
    related: Vec<String>,
    cancel: Option<Arc<Notify>>,
}

/// Controller owning the single in-flight question/answer exchange.
pub struct RequestController<B> {
    backend: Arc<B>,
    state: Mutex<AnswerState>,
}

impl<B: Backend> RequestController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(AnswerState::default()),
        }
    }

    /// Submit a question, superseding any outstanding exchange.
    ///
    /// An empty (after trimming) question is rejected with no side effects.
    /// On acceptance the previously displayed answer and related questions
    /// are cleared before the network call resolves.
    pub async fn submit(&self, question: &str, params: AskParams) -> SubmitOutcome {
        let question = question.trim();
        if question.is_empty() {
            return SubmitOutcome::Rejected;
        }

        // Accept: cancel the in-flight exchange, bump the generation, and
        // clear the visible answer in one critical section, so another
        // submit cannot interleave between the bump and the clear.
        let cancel = Arc::new(Notify::new());
        let generation = {
            let mut state = match self.state.lock() {
                Ok(s) => s,
                Err(e) => e.into_inner(),
            };
            state.generation += 1;
            if let Some(previous) = state.cancel.replace(Arc::clone(&cancel)) {
                previous.notify_one();
            }
            state.loading = true;
            state.current = None;
            state.related.clear();
            state.generation
        };

        let request = ExplainRequest {
            question: question.to_string(),
            age: params.age,
            length: params.length,
            language: params.language,
        };

        let settled = tokio::select! {
            result = self.backend.explain(&request) => result,
            _ = cancel.notified() => {
                debug!(question, "Explain exchange superseded");
                return SubmitOutcome::Superseded;
            }
        };

        let (explanation, related) = match settled {
            Ok(response) => {
                let explanation = Explanation::new(
                    question.to_string(),
                    params.age,
                    params.length,
                    response.answer,
                );
                (explanation, response.related.0)
            }
            Err(error) => {
                debug!(question, error = %error, "Explain exchange failed");
                let explanation = Explanation::from_error(
                    question.to_string(),
                    params.age,
                    params.length,
                    &error.to_string(),
                );
                (explanation, Vec::new())
            }
        };

        // Publish under the same lock as the generation check: a newer
        // submit may have been accepted while the response was in transit,
        // and its state must win.
        {
            let mut state = match self.state.lock() {
                Ok(s) => s,
                Err(e) => e.into_inner(),
            };
            if state.generation != generation {
                return SubmitOutcome::Superseded;
            }
            state.loading = false;
            state.current = Some(explanation.clone());
            state.related = related;
        }

        SubmitOutcome::Answered(explanation)
    }

    /// The currently visible explanation, if any.
    pub fn current(&self) -> Option<Explanation> {
        self.state.lock().ok().and_then(|s| s.current.clone())
    }

    /// Related questions attached to the current answer.
    pub fn related(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.related.clone())
            .unwrap_or_default()
    }

    /// Whether an accepted submit is still awaiting its exchange.
    pub fn is_loading(&self) -> bool {
        self.state.lock().map(|s| s.loading).unwrap_or(false)
    }

    /// Abort any in-flight exchange and reset visible state.
    ///
    /// Bumps the generation so an exchange that already settled but has not
    /// yet published is discarded too.
    pub fn teardown(&self) {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(e) => e.into_inner(),
        };
        state.generation += 1;
        if let Some(handle) = state.cancel.take() {
            handle.notify_one();
        }
        state.loading = false;
        state.current = None;
        state.related.clear();
    }
}
