//! Error types for Veritas.

use thiserror::Error;

/// Longest slice of raw model text kept on an error for logging.
const SNIPPET_LEN: usize = 200;

/// Library-level error type for Veritas operations.
#[derive(Error, Debug)]
pub enum VeritasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error: {0}")]
    OpenAI(String),

    #[error("Conversation session error: {0}")]
    Session(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The search backend could not produce results for this call.
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// The model asked for a tool the catalog does not declare, or left out
    /// a required argument.
    #[error("Tool protocol violation: {reason}")]
    ToolProtocolViolation { reason: String, snippet: String },

    /// The final answer was not a JSON object after fence stripping.
    #[error("Malformed model output: {reason}")]
    MalformedModelOutput { reason: String, snippet: String },

    /// The final answer parsed but lacks required fields.
    #[error("Incomplete model output: missing or unusable field(s) {}", .fields.join(", "))]
    IncompleteModelOutput { fields: Vec<String>, snippet: String },
}

impl VeritasError {
    pub fn tool_protocol(reason: impl Into<String>, raw: &str) -> Self {
        Self::ToolProtocolViolation {
            reason: reason.into(),
            snippet: snippet(raw),
        }
    }

    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::MalformedModelOutput {
            reason: reason.into(),
            snippet: snippet(raw),
        }
    }

    pub fn incomplete(fields: Vec<String>, raw: &str) -> Self {
        Self::IncompleteModelOutput {
            fields,
            snippet: snippet(raw),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::TomlParse(_) => "toml",
            Self::Http(_) => "http",
            Self::OpenAI(_) => "model_unavailable",
            Self::Session(_) => "session",
            Self::InvalidInput(_) => "invalid_input",
            Self::SearchUnavailable(_) => "search_unavailable",
            Self::ToolProtocolViolation { .. } => "tool_protocol_violation",
            Self::MalformedModelOutput { .. } => "malformed_model_output",
            Self::IncompleteModelOutput { .. } => "incomplete_model_output",
        }
    }

    /// Offending raw model text, for logs only.
    pub fn snippet(&self) -> Option<&str> {
        match self {
            Self::ToolProtocolViolation { snippet, .. }
            | Self::MalformedModelOutput { snippet, .. }
            | Self::IncompleteModelOutput { snippet, .. } => Some(snippet),
            _ => None,
        }
    }

    /// Message that is safe to show to end users.
    ///
    /// Never includes model text or upstream error bodies.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::SearchUnavailable(_) => {
                "Web search is currently unavailable. Please try again shortly.".to_string()
            }
            Self::OpenAI(_) | Self::Session(_) => {
                "The verification model could not be reached. Please try again shortly.".to_string()
            }
            Self::ToolProtocolViolation { .. }
            | Self::MalformedModelOutput { .. }
            | Self::IncompleteModelOutput { .. } => {
                "The verification could not be completed reliably. Please resubmit the claim."
                    .to_string()
            }
            _ => "Internal error while verifying the claim.".to_string(),
        }
    }
}

fn snippet(raw: &str) -> String {
    raw.chars().take(SNIPPET_LEN).collect()
}

/// Result type alias for Veritas operations.
pub type Result<T> = std::result::Result<T, VeritasError>;
