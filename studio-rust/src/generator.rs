use crate::{
    prompt, schema, AdminSettings, FunnelCopy, FunnelInput, GeneratedFunnel, GenerationError,
    ResponseParseError,
};
use chrono::Utc;
use copyfunnel_sdk::{
    LanguageModel, LanguageModelInput, Message, ResponseFormatJson, ResponseFormatOption,
};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};
use tracing_futures::Instrument;

const SCHEMA_NAME: &str = "marketing_funnel";

/// Turns a brief into a [`GeneratedFunnel`] with one language model call.
pub struct FunnelGenerator {
    model: Arc<dyn LanguageModel>,
}

impl FunnelGenerator {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub fn provider(&self) -> &'static str {
        self.model.provider()
    }

    pub fn model_id(&self) -> String {
        self.model.model_id()
    }

    /// The exact request sent for a brief. Only the prompt, system
    /// instruction and temperature depend on the arguments.
    pub fn build_request(input: &FunnelInput, settings: &AdminSettings) -> LanguageModelInput {
        LanguageModelInput {
            system_prompt: Some(settings.system_instruction.clone()),
            messages: vec![Message::user(prompt::build_prompt(input, settings))],
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: SCHEMA_NAME.to_string(),
                description: Some(
                    "Landing page copy, a three email sequence, ad variants and a strategy \
                     summary."
                        .to_string(),
                ),
                schema: Some(schema::funnel_response_schema()),
            })),
            temperature: Some(settings.model_temperature),
            max_tokens: None,
        }
    }

    /// Single attempt, no retry. Does not touch any persisted state.
    pub async fn generate(
        &self,
        input: &FunnelInput,
        settings: &AdminSettings,
    ) -> Result<GeneratedFunnel, GenerationError> {
        let span = info_span!(
            "copyfunnel.generate_funnel",
            provider = self.model.provider(),
            model = %self.model.model_id(),
            tone = %input.tone,
            language = %input.language,
        );

        async move {
            let request = Self::build_request(input, settings);
            debug!(
                prompt_chars = request.messages.iter().map(|m| m.text.len()).sum::<usize>(),
                temperature = settings.model_temperature,
                "sending funnel request"
            );

            let response = self.model.generate(request).await.map_err(|error| {
                warn!(%error, "language model call failed");
                GenerationError::from(error)
            })?;

            let text = response.text.unwrap_or_default();
            let copy = parse_funnel_response(&text).inspect_err(|error| {
                warn!(%error, "funnel response rejected");
            })?;

            let funnel = GeneratedFunnel::stamp(copy, input.clone(), Utc::now());
            info!(
                funnel_id = %funnel.id,
                emails = funnel.emails.len(),
                ads = funnel.ads.len(),
                "funnel generated"
            );
            Ok(funnel)
        }
        .instrument(span)
        .await
    }
}

/// Parse the model's text payload and check it against the funnel schema
/// before decoding.
pub fn parse_funnel_response(text: &str) -> Result<FunnelCopy, ResponseParseError> {
    if text.trim().is_empty() {
        return Err(ResponseParseError::Empty);
    }

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(ResponseParseError::InvalidJson)?;

    let violations = schema::validate(&schema::funnel_response_schema(), &value);
    if !violations.is_empty() {
        return Err(ResponseParseError::Schema { violations });
    }

    serde_json::from_value(value).map_err(ResponseParseError::Decode)
}
