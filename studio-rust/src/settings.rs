use crate::SettingsError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=1.0;

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert copywriter specializing in sales \
     funnels (ClickFunnels, Russell Brunson style). You output strictly valid JSON.";
const DEFAULT_BASE_PROMPT_TEMPLATE: &str = "Act as a world-class Direct Response Marketing \
     Expert. Create a complete marketing funnel for the following product/service:";
const DEFAULT_MODEL_TEMPERATURE: f64 = 0.7;

/// Admin-tunable parameters applied to every generation.
/// # Default Values
/// - `system_instruction`: copywriter persona that answers in JSON
/// - `base_prompt_template`: direct-response expert preamble
/// - `model_temperature`: 0.7
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    /// Persona guidance sent as the system instruction.
    pub system_instruction: String,
    /// Text placed before the brief in every prompt.
    pub base_prompt_template: String,
    /// Sampling temperature. Ranges from 0.0 to 1.0
    pub model_temperature: f64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            base_prompt_template: DEFAULT_BASE_PROMPT_TEMPLATE.to_string(),
            model_temperature: DEFAULT_MODEL_TEMPERATURE,
        }
    }
}

impl AdminSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if TEMPERATURE_RANGE.contains(&self.model_temperature) {
            Ok(())
        } else {
            Err(SettingsError::TemperatureOutOfRange(self.model_temperature))
        }
    }
}
