use crate::{schema::SchemaViolation, storage::StorageKey, InvalidFieldValue};
use copyfunnel_sdk::LanguageModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential is available for the language model provider. The user
    /// has to configure one; retrying does not help.
    #[error("No credential configured for the {0} language model")]
    Configuration(&'static str),
    #[error("Failed to parse AI response: {0}")]
    ResponseParse(#[from] ResponseParseError),
    /// Transport or remote failure reported by the language model.
    #[error("Language model service error: {0}")]
    Service(#[source] LanguageModelError),
}

impl From<LanguageModelError> for GenerationError {
    fn from(error: LanguageModelError) -> Self {
        match error {
            LanguageModelError::MissingCredential(provider) => Self::Configuration(provider),
            other => Self::Service(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResponseParseError {
    #[error("the model returned no text")]
    Empty,
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("response does not match the funnel schema: {}", join_violations(.violations))]
    Schema { violations: Vec<SchemaViolation> },
    /// The document passed structural validation but still could not be
    /// decoded into a funnel.
    #[error("response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage backend failed for {key}: {source}")]
    Backend {
        key: StorageKey,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("Model temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f64),
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("No template is open for editing")]
    NoDraft,
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldValue),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The backup document could not be used. Nothing has been applied.
#[derive(Debug, Error)]
pub enum ImportFormatError {
    #[error("Backup is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Backup must be a JSON object")]
    NotAnObject,
    #[error("Backup has an unexpected shape: {0}")]
    InvalidShape(#[source] serde_json::Error),
    #[error("Backup contains invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Import(#[from] ImportFormatError),
}

pub type StudioResult<T> = Result<T, StudioError>;
