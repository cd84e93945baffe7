//! CurioMind application binary - composition root.
//!
//! Ties together the CurioMind crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the notes store (single JSON blob in the data directory)
//! 3. Build the HTTP backend client
//! 4. Dispatch the subcommand (ask / notes / export / languages)

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use curiomind_client::{Backend, HttpBackend, RequestController, SubmitOutcome, TypingRevealer};
use curiomind_core::config::CurioConfig;
use curiomind_core::types::{AnswerLength, Explanation, ExplanationId, ExportFormat, LanguageCode};
use curiomind_export::ExportPipeline;
use curiomind_notes::NotesStore;

mod cli;

use cli::{CliArgs, Command, NotesAction};

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Print the explanation text one prefix at a time, rewriting the line.
async fn reveal_to_stdout(revealer: &TypingRevealer, text: &str) {
    let mut rx = revealer.reveal(text);
    let mut stdout = std::io::stdout();
    while let Some(prefix) = rx.recv().await {
        let _ = write!(stdout, "\r{}", prefix);
        let _ = stdout.flush();
    }
    println!();
}

fn print_note(index: usize, note: &Explanation) {
    let when = note.created_at.to_datetime().format("%Y-%m-%d %H:%M");
    println!("{}. [{}] {} ({})", index + 1, note.id, note.question, when);
    println!("   {}", note.text);
}

async fn run_ask<B: Backend>(
    controller: &RequestController<B>,
    revealer: &TypingRevealer,
    backend: &Arc<B>,
    store: &NotesStore,
    question: &str,
    age: Option<u8>,
    length: Option<AnswerLength>,
    language: Option<LanguageCode>,
    save: bool,
    no_reveal: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let age = CliArgs::resolve_age(age)?;
    let params = curiomind_client::AskParams {
        age,
        length: length.unwrap_or_default(),
        language: language.unwrap_or_default(),
    };

    let explanation = match controller.submit(question, params).await {
        SubmitOutcome::Rejected => {
            eprintln!("Nothing to ask: the question is empty.");
            return Ok(());
        }
        SubmitOutcome::Superseded => return Ok(()),
        SubmitOutcome::Answered(explanation) => explanation,
    };

    if no_reveal {
        println!("{}", explanation.text);
    } else {
        reveal_to_stdout(revealer, &explanation.text).await;
    }

    let related = controller.related();
    if !related.is_empty() {
        println!("\nRelated questions:");
        for question in &related {
            println!("  - {}", question);
        }
    }

    // Error-flavored explanations are saved too; the collection mirrors
    // whatever the user chose to keep.
    if save {
        store.add(explanation.clone());
        println!("\nSaved to notes.");
        // Best-effort server-side mirror; local save already succeeded.
        if let Err(e) = backend
            .notify_note_added(&explanation.question, &explanation.text)
            .await
        {
            tracing::debug!(error = %e, "Note-added notification failed");
        }
    }

    Ok(())
}

fn run_notes(store: &NotesStore, action: NotesAction) {
    match action {
        NotesAction::List => {
            let notes = store.all();
            if notes.is_empty() {
                println!("No saved notes.");
                return;
            }
            for (i, note) in notes.iter().enumerate() {
                print_note(i, note);
            }
        }
        NotesAction::Search { query } => {
            let hits = store.search(&query);
            if hits.is_empty() {
                println!("No notes match \"{}\".", query);
                return;
            }
            for (i, note) in hits.iter().enumerate() {
                print_note(i, note);
            }
        }
        NotesAction::Delete { id } => {
            if store.delete(ExplanationId(id)) {
                println!("Deleted.");
            } else {
                println!("No note with id {}.", id);
            }
        }
        NotesAction::Clear { yes } => {
            if store.clear(yes) {
                println!("All notes deleted.");
            } else if !yes {
                println!("Refusing to delete without --yes.");
            } else {
                println!("No saved notes.");
            }
        }
    }
}

async fn run_export(
    pipeline: &ExportPipeline<HttpBackend>,
    store: &NotesStore,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = match pipeline.export(format, store).await? {
        Some(document) => document,
        None => {
            println!("No saved notes; nothing to export.");
            return Ok(());
        }
    };

    let path = out.unwrap_or_else(|| PathBuf::from(&document.filename));
    std::fs::write(&path, &document.bytes)?;
    println!(
        "Exported {} notes to {} ({} bytes).",
        store.len(),
        path.display(),
        document.bytes.len()
    );
    Ok(())
}

fn run_languages() {
    for code in LanguageCode::ALL {
        println!("{:4} {}", code.as_str(), code.label());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = CurioConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting CurioMind v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Notes store.
    let data_dir = args
        .resolve_data_dir()
        .map(PathBuf::from)
        .unwrap_or_else(|| resolve_data_dir(&config.general.data_dir));
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let store = NotesStore::open(data_dir.join("notes.json"));

    // Backend client.
    let backend = Arc::new(HttpBackend::with_timeout(
        config.backend.base_url.clone(),
        Duration::from_secs(config.backend.timeout_secs),
    )?);

    match args.command {
        Command::Ask {
            question,
            age,
            length,
            language,
            save,
            no_reveal,
        } => {
            let controller = RequestController::new(Arc::clone(&backend));
            let revealer = TypingRevealer::new();
            run_ask(
                &controller,
                &revealer,
                &backend,
                &store,
                &question,
                age,
                length,
                language,
                save,
                no_reveal,
            )
            .await?;
        }
        Command::Notes { action } => run_notes(&store, action),
        Command::Export { format, out } => {
            let pipeline = ExportPipeline::new(Arc::clone(&backend));
            run_export(&pipeline, &store, format, out).await?;
        }
        Command::Languages => run_languages(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use curiomind_client::{BackendError, ExplainRequest, ExplainResponse};
    use curiomind_core::types::RelatedQuestions;

    struct ScriptedBackend {
        fail: bool,
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        async fn explain(
            &self,
            request: &ExplainRequest,
        ) -> Result<ExplainResponse, BackendError> {
            if self.fail {
                return Err(BackendError::Status { status: 500 });
            }
            Ok(ExplainResponse {
                answer: format!("answer to {}", request.question),
                related: RelatedQuestions::default(),
            })
        }

        async fn fetch_export(&self, _format: ExportFormat) -> Result<Vec<u8>, BackendError> {
            Err(BackendError::Status { status: 404 })
        }

        async fn notify_note_added(&self, _q: &str, _e: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    async fn ask_and_save(fail: bool, question: &str, store: &NotesStore) {
        let backend = Arc::new(ScriptedBackend { fail });
        let controller = RequestController::new(Arc::clone(&backend));
        let revealer = TypingRevealer::new();
        run_ask(
            &controller,
            &revealer,
            &backend,
            store,
            question,
            None,
            None,
            None,
            true,
            true,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_ask_save_keeps_successful_explanation() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::open(dir.path().join("notes.json"));
        ask_and_save(false, "why is rain wet?", &store).await;

        let notes = store.all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].question, "why is rain wet?");
        assert!(!notes[0].is_error());
    }

    #[tokio::test]
    async fn test_ask_save_keeps_error_explanation_too() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::open(dir.path().join("notes.json"));
        ask_and_save(true, "why?", &store).await;

        let notes = store.all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].question, "why?");
        assert!(notes[0].is_error());
        assert_eq!(notes[0].text, "Error: HTTP 500");
    }

    #[tokio::test]
    async fn test_ask_without_save_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::open(dir.path().join("notes.json"));
        let backend = Arc::new(ScriptedBackend { fail: false });
        let controller = RequestController::new(Arc::clone(&backend));
        let revealer = TypingRevealer::new();
        run_ask(
            &controller,
            &revealer,
            &backend,
            &store,
            "transient?",
            None,
            None,
            None,
            false,
            true,
        )
        .await
        .unwrap();

        assert!(store.is_empty());
    }
}
