use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    errors::{LanguageModelError, LanguageModelResult},
    language_model::LanguageModel,
    LanguageModelInput, ModelResponse,
};

/// One scripted outcome of [`MockLanguageModel::generate`].
pub enum MockGenerateResult {
    Response(ModelResponse),
    Error(LanguageModelError),
}

impl MockGenerateResult {
    pub fn response(response: ModelResponse) -> Self {
        Self::Response(response)
    }

    pub fn error(error: LanguageModelError) -> Self {
        Self::Error(error)
    }

    fn into_result(self) -> LanguageModelResult<ModelResponse> {
        match self {
            Self::Response(response) => Ok(response),
            Self::Error(error) => Err(error),
        }
    }
}

impl From<ModelResponse> for MockGenerateResult {
    fn from(response: ModelResponse) -> Self {
        Self::Response(response)
    }
}

impl From<LanguageModelError> for MockGenerateResult {
    fn from(error: LanguageModelError) -> Self {
        Self::Error(error)
    }
}

#[derive(Default)]
struct Script {
    pending: VecDeque<MockGenerateResult>,
    calls: Vec<LanguageModelInput>,
}

/// Language model that replays queued outcomes in order and records every
/// request it receives. Calling it with an empty queue is an
/// [`LanguageModelError::Invariant`] error.
pub struct MockLanguageModel {
    provider: &'static str,
    model_id: String,
    script: Mutex<Script>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self {
            provider: "mock",
            model_id: "mock-model".to_string(),
            script: Mutex::default(),
        }
    }
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_provider(&mut self, provider: &'static str) {
        self.provider = provider;
    }

    pub fn set_model_id<S: Into<String>>(&mut self, model_id: S) {
        self.model_id = model_id.into();
    }

    // A panicking test must not hide the script from later assertions.
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the outcome of a future call. Chainable.
    pub fn enqueue_generate<R>(&self, result: R) -> &Self
    where
        R: Into<MockGenerateResult>,
    {
        self.script().pending.push_back(result.into());
        self
    }

    /// Queued outcomes not consumed yet.
    pub fn pending_results(&self) -> usize {
        self.script().pending.len()
    }

    /// Every input passed to `generate`, oldest first.
    pub fn tracked_generate_inputs(&self) -> Vec<LanguageModelInput> {
        self.script().calls.clone()
    }

    /// Forget queued outcomes and recorded inputs.
    pub fn restore(&self) {
        *self.script() = Script::default();
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let mut script = self.script();
        script.calls.push(input);
        let next = script.pending.pop_front();
        drop(script);

        next.ok_or_else(|| {
            LanguageModelError::Invariant(self.provider, "nothing queued for generate".into())
        })?
        .into_result()
    }
}
