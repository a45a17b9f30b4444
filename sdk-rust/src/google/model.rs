use super::api::{
    Content, GenerateContentConfig, GenerateContentParameters, GenerateContentResponse,
    Part as GooglePart, UsageMetadata,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage, ResponseFormatOption, Role,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GoogleModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    /// An empty key is accepted here; `generate` then fails with
    /// [`LanguageModelError::MissingCredential`] without sending anything.
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            base_url,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let key_value = HeaderValue::from_str(&self.api_key).map_err(|error| {
            LanguageModelError::InvalidInput(format!("Invalid Google API key: {error}"))
        })?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key_value);

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id(),
            input,
            |input| async move {
                if self.api_key.trim().is_empty() {
                    return Err(LanguageModelError::MissingCredential(PROVIDER));
                }

                let params = convert_to_generate_content_parameters(input, &self.model_id);
                let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

                let headers = self.request_headers()?;
                let response: GenerateContentResponse =
                    client_utils::send_json(&self.client, &url, &params, headers).await?;

                map_google_response(response)
            },
        )
        .await
    }
}

fn convert_to_generate_content_parameters(
    input: LanguageModelInput,
    model_id: &str,
) -> GenerateContentParameters {
    let mut params = GenerateContentParameters {
        model: format!("models/{model_id}"),
        contents: input.messages.into_iter().map(convert_to_google_content).collect(),
        ..Default::default()
    };

    if let Some(system_prompt) = input.system_prompt {
        params.system_instruction = Some(Content {
            role: None,
            parts: Some(vec![GooglePart {
                text: Some(system_prompt),
                ..Default::default()
            }]),
        });
    }

    let mut config = GenerateContentConfig {
        temperature: input.temperature,
        max_output_tokens: input.max_tokens,
        ..Default::default()
    };

    if let Some(response_format) = input.response_format {
        let (response_mime_type, response_json_schema) =
            convert_to_google_response_schema(response_format);
        config.response_mime_type = Some(response_mime_type);
        config.response_json_schema = response_json_schema;
    }

    params.generation_config = Some(config);
    params
}

fn convert_to_google_content(message: Message) -> Content {
    let role = match message.role {
        Role::User => "user",
        Role::Model => "model",
    };
    Content {
        role: Some(role.to_string()),
        parts: Some(vec![GooglePart {
            text: Some(message.text),
            ..Default::default()
        }]),
    }
}

fn convert_to_google_response_schema(
    response_format: ResponseFormatOption,
) -> (String, Option<serde_json::Value>) {
    match response_format {
        ResponseFormatOption::Text => ("text/plain".to_string(), None),
        ResponseFormatOption::Json(json_format) => {
            ("application/json".to_string(), json_format.schema)
        }
    }
}

fn map_google_response(response: GenerateContentResponse) -> LanguageModelResult<ModelResponse> {
    let usage = response.usage_metadata.as_ref().map(map_google_usage_metadata);

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LanguageModelError::Refusal(format!(
                "Prompt blocked by provider: {reason}"
            )));
        }
        return Err(LanguageModelError::Invariant(
            PROVIDER,
            "No candidate in response".to_string(),
        ));
    };

    let texts: Vec<String> = candidate
        .content
        .and_then(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought.unwrap_or(false))
        .filter_map(|part| part.text)
        .collect();

    if texts.is_empty() {
        if let Some(reason) = candidate.finish_reason.filter(|r| r.is_refusal()) {
            let detail = candidate
                .finish_message
                .unwrap_or_else(|| format!("{reason:?}"));
            return Err(LanguageModelError::Refusal(detail));
        }
    }

    Ok(ModelResponse {
        text: if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        },
        usage,
    })
}

fn map_google_usage_metadata(usage: &UsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0)
            + usage.thoughts_token_count.unwrap_or(0),
    }
}
