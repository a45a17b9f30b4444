use crate::{AdminSettings, FunnelTemplate, GeneratedFunnel, ImportFormatError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const BACKUP_VERSION: &str = "1.0";

/// Everything the application persists, as one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub settings: AdminSettings,
    pub templates: Vec<FunnelTemplate>,
    pub history: Vec<GeneratedFunnel>,
    pub version: String,
    pub exported_at: DateTime<Utc>,
}

impl BackupEnvelope {
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn into_partial(self) -> PartialEnvelope {
        PartialEnvelope {
            settings: Some(self.settings),
            templates: Some(self.templates),
            history: Some(self.history),
            version: Some(self.version),
            exported_at: Some(self.exported_at.to_rfc3339()),
        }
    }
}

/// A backup as read back in. Any top-level key may be missing (or `null`);
/// only the present ones are applied on import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AdminSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<FunnelTemplate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<GeneratedFunnel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

impl PartialEnvelope {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            history_items: self.history.as_ref().map_or(0, Vec::len),
            templates: self.templates.as_ref().map_or(0, Vec::len),
            has_settings: self.settings.is_some(),
        }
    }
}

/// What an import would overwrite, shown before asking for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub history_items: usize,
    pub templates: usize,
    pub has_settings: bool,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- {} items in history", self.history_items)?;
        write!(f, "- {} templates", self.templates)?;
        if self.has_settings {
            write!(f, "\n- admin settings")?;
        }
        Ok(())
    }
}

/// Validate a whole backup document up front, so that an import either
/// applies entirely or not at all.
pub fn parse_backup(text: &str) -> Result<PartialEnvelope, ImportFormatError> {
    let value: Value = serde_json::from_str(text).map_err(ImportFormatError::InvalidJson)?;
    if !value.is_object() {
        return Err(ImportFormatError::NotAnObject);
    }

    let envelope: PartialEnvelope =
        serde_json::from_value(value).map_err(ImportFormatError::InvalidShape)?;
    if let Some(settings) = &envelope.settings {
        settings.validate()?;
    }
    Ok(envelope)
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("copyfunnel-backup-{}.json", date.format("%Y-%m-%d"))
}
