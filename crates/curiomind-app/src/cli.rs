//! CLI argument definitions for the CurioMind application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use curiomind_core::types::{Age, AnswerLength, ExportFormat, LanguageCode};

/// CurioMind — age-tailored explanations with a durable notes collection.
#[derive(Parser, Debug)]
#[command(name = "curiomind", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory holding the notes blob.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a question and watch the explanation appear.
    Ask {
        /// The question to explain.
        question: String,

        /// Reader age in years (5-18).
        #[arg(short = 'a', long = "age")]
        age: Option<u8>,

        /// Answer length (Short, Medium, Detailed).
        #[arg(short = 'L', long = "length")]
        length: Option<AnswerLength>,

        /// Answer language code (en, hi, kn, ...); see `languages`.
        #[arg(long = "language")]
        language: Option<LanguageCode>,

        /// Save the explanation into the notes collection.
        #[arg(short = 's', long = "save")]
        save: bool,

        /// Print the full answer at once instead of revealing it.
        #[arg(long = "no-reveal")]
        no_reveal: bool,
    },

    /// Manage the saved notes collection.
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Export the notes collection as a document.
    Export {
        /// Document format (pdf or docx).
        format: ExportFormat,

        /// Output path; defaults to the format's fixed filename in the
        /// current directory.
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },

    /// List the supported answer languages.
    Languages,
}

#[derive(Subcommand, Debug)]
pub enum NotesAction {
    /// List all saved notes, most recent first.
    List,

    /// Search notes by question or answer text.
    Search {
        /// Case-insensitive substring to look for.
        query: String,
    },

    /// Delete one note by id.
    Delete {
        /// Id shown by `notes list`.
        id: Uuid,
    },

    /// Delete every note.
    Clear {
        /// Confirm the deletion; without this flag nothing happens.
        #[arg(long = "yes")]
        yes: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CURIOMIND_CONFIG env var > platform default
    /// (~/.curiomind/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CURIOMIND_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > config file value.
    /// Returns `None` if not overridden (use config default).
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Validate an `ask --age` value into the supported range.
    pub fn resolve_age(age: Option<u8>) -> Result<Age, String> {
        match age {
            Some(years) => Age::new(years).map_err(|e| e.to_string()),
            None => Ok(Age::default()),
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".curiomind").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".curiomind").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_defaults() {
        let args = CliArgs::parse_from(["curiomind", "ask", "why is the sky blue?"]);
        match args.command {
            Command::Ask {
                question,
                age,
                length,
                language,
                save,
                no_reveal,
            } => {
                assert_eq!(question, "why is the sky blue?");
                assert!(age.is_none());
                assert!(length.is_none());
                assert!(language.is_none());
                assert!(!save);
                assert!(!no_reveal);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_with_options() {
        let args = CliArgs::parse_from([
            "curiomind", "ask", "-a", "8", "-L", "Short", "--language", "hi", "--save",
            "what is rain?",
        ]);
        match args.command {
            Command::Ask {
                age,
                length,
                language,
                save,
                ..
            } => {
                assert_eq!(age, Some(8));
                assert_eq!(length, Some(AnswerLength::Short));
                assert_eq!(language, Some(LanguageCode::Hi));
                assert!(save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_format_parsing() {
        let args = CliArgs::parse_from(["curiomind", "export", "docx"]);
        match args.command {
            Command::Export { format, out } => {
                assert_eq!(format, ExportFormat::Docx);
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_export_format_rejected() {
        assert!(CliArgs::try_parse_from(["curiomind", "export", "odt"]).is_err());
    }

    #[test]
    fn test_notes_clear_requires_flag_for_confirmation() {
        let args = CliArgs::parse_from(["curiomind", "notes", "clear"]);
        match args.command {
            Command::Notes {
                action: NotesAction::Clear { yes },
            } => assert!(!yes),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_age_validates_range() {
        assert!(CliArgs::resolve_age(Some(4)).is_err());
        assert!(CliArgs::resolve_age(Some(19)).is_err());
        assert_eq!(CliArgs::resolve_age(Some(12)).unwrap(), Age(12));
        assert_eq!(CliArgs::resolve_age(None).unwrap(), Age::default());
    }
}
