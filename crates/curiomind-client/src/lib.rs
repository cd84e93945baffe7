//! Client-side request layer for CurioMind.
//!
//! Owns the backend transport seam, the single-flight explanation request
//! controller, and the progressive text reveal used when presenting answers.

pub mod backend;
pub mod controller;
pub mod reveal;

pub use backend::{Backend, BackendError, ExplainRequest, ExplainResponse, HttpBackend};
pub use controller::{AskParams, RequestController, SubmitOutcome};
pub use reveal::{step_delay, RevealSequence, TypingRevealer};
