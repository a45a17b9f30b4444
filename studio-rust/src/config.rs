use crate::{gate::AdminGate, gate::DEFAULT_ADMIN_PIN};
use copyfunnel_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel,
};
use std::{env, path::PathBuf, sync::Arc};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_DATA_DIR: &str = ".copyfunnel";

/// Checked in order; the first non-empty value wins.
pub const API_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

/// Runtime configuration read from the environment (and `.env`, when the
/// binary loads one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// `None` is allowed at startup. Generation then fails with a
    /// configuration error.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub data_dir: PathBuf,
    pub admin_pin: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            admin_pin: DEFAULT_ADMIN_PIN.to_string(),
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: API_KEY_VARS.iter().find_map(|name| var(name)),
            model: var("COPYFUNNEL_MODEL").unwrap_or(defaults.model),
            base_url: var("COPYFUNNEL_GOOGLE_BASE_URL"),
            data_dir: var("COPYFUNNEL_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            admin_pin: var("COPYFUNNEL_ADMIN_PIN").unwrap_or(defaults.admin_pin),
        }
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.admin_pin.clone())
    }

    pub fn language_model(&self) -> Arc<dyn LanguageModel> {
        Arc::new(GoogleModel::new(
            self.model.clone(),
            GoogleModelOptions {
                api_key: self.api_key.clone().unwrap_or_default(),
                base_url: self.base_url.clone(),
                ..Default::default()
            },
        ))
    }
}
