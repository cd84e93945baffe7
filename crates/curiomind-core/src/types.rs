use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking an explanation whose text carries a failure message
/// instead of an answer.
pub const ERROR_TEXT_PREFIX: &str = "Error: ";

/// Maximum number of suggested follow-up questions attached to a response.
pub const MAX_RELATED_QUESTIONS: usize = 5;

// =============================================================================
// Enums
// =============================================================================

/// Requested answer length.
///
/// Variant names double as the wire values sent to the `/explain` endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLength {
    Short,
    #[default]
    Medium,
    Detailed,
}

impl AnswerLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLength::Short => "Short",
            AnswerLength::Medium => "Medium",
            AnswerLength::Detailed => "Detailed",
        }
    }
}

impl std::str::FromStr for AnswerLength {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(AnswerLength::Short),
            "medium" => Ok(AnswerLength::Medium),
            "detailed" => Ok(AnswerLength::Detailed),
            other => Err(format!(
                "unknown length '{}' (expected short, medium, or detailed)",
                other
            )),
        }
    }
}

/// Target language for the explanation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Hi,
    Kn,
    Ta,
    Te,
    Ml,
    Bn,
    Gu,
    Mr,
    Ur,
}

impl LanguageCode {
    /// All supported languages, in UI order.
    pub const ALL: [LanguageCode; 10] = [
        LanguageCode::En,
        LanguageCode::Hi,
        LanguageCode::Kn,
        LanguageCode::Ta,
        LanguageCode::Te,
        LanguageCode::Ml,
        LanguageCode::Bn,
        LanguageCode::Gu,
        LanguageCode::Mr,
        LanguageCode::Ur,
    ];

    /// ISO 639-1 code, as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Hi => "hi",
            LanguageCode::Kn => "kn",
            LanguageCode::Ta => "ta",
            LanguageCode::Te => "te",
            LanguageCode::Ml => "ml",
            LanguageCode::Bn => "bn",
            LanguageCode::Gu => "gu",
            LanguageCode::Mr => "mr",
            LanguageCode::Ur => "ur",
        }
    }

    /// Human-readable language name.
    pub fn label(&self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Hi => "Hindi",
            LanguageCode::Kn => "Kannada",
            LanguageCode::Ta => "Tamil",
            LanguageCode::Te => "Telugu",
            LanguageCode::Ml => "Malayalam",
            LanguageCode::Bn => "Bengali",
            LanguageCode::Gu => "Gujarati",
            LanguageCode::Mr => "Marathi",
            LanguageCode::Ur => "Urdu",
        }
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LanguageCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown language code '{}'", s))
    }
}

/// Document format requested from the export endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    /// Wire value for the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(format!("unknown export format '{}' (expected pdf or docx)", other)),
        }
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Unique identifier for an explanation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExplanationId(pub Uuid);

impl ExplanationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExplanationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExplanationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix timestamp in milliseconds since epoch.
///
/// Used for display only, never for ordering logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

/// Requested audience age.
///
/// Invariant: always within `[Age::MIN_YEARS, Age::MAX_YEARS]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Age(pub u8);

impl Age {
    pub const MIN_YEARS: u8 = 5;
    pub const MAX_YEARS: u8 = 18;

    pub fn new(years: u8) -> std::result::Result<Self, &'static str> {
        if !(Self::MIN_YEARS..=Self::MAX_YEARS).contains(&years) {
            return Err("Age must be between 5 and 18");
        }
        Ok(Self(years))
    }

    /// Force a raw value into range. Used when repairing persisted entries.
    pub fn clamped(years: u8) -> Self {
        Self(years.clamp(Self::MIN_YEARS, Self::MAX_YEARS))
    }
}

impl Default for Age {
    fn default() -> Self {
        Self(10)
    }
}

/// Suggested follow-up questions for the most recent successful response.
///
/// Ephemeral: attached to a response, never persisted. Holds at most
/// [`MAX_RELATED_QUESTIONS`] entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedQuestions(pub Vec<String>);

impl RelatedQuestions {
    /// Build from a wire list, truncating to the maximum.
    pub fn truncated(mut questions: Vec<String>) -> Self {
        questions.truncate(MAX_RELATED_QUESTIONS);
        Self(questions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

// =============================================================================
// Entity
// =============================================================================

/// The answer record for one question, including its generation parameters.
///
/// `text` is immutable after creation; a correction requires a new
/// `Explanation`. A failed request produces the same shape with an
/// `Error: `-prefixed `text` rather than a separate variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub id: ExplanationId,
    pub question: String,
    pub age: Age,
    pub length: AnswerLength,
    pub text: String,
    pub created_at: Timestamp,
}

impl Explanation {
    /// Wrap a successful answer with a fresh id and the current time.
    pub fn new(question: String, age: Age, length: AnswerLength, text: String) -> Self {
        Self {
            id: ExplanationId::new(),
            question,
            age,
            length,
            text,
            created_at: Timestamp::now(),
        }
    }

    /// Synthesize the error-flavored explanation for a failed request.
    pub fn from_error(question: String, age: Age, length: AnswerLength, message: &str) -> Self {
        Self::new(question, age, length, format!("{}{}", ERROR_TEXT_PREFIX, message))
    }

    /// Whether this explanation carries a failure message instead of an answer.
    pub fn is_error(&self) -> bool {
        self.text.starts_with(ERROR_TEXT_PREFIX)
    }
}

// =============================================================================
// Tests
// =============================================================================
