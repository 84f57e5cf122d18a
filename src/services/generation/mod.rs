/// Text-generation client abstraction
///
/// One generation attempt per recommendation request; implementations never
/// retry. Transport failures, non-2xx statuses and replies without the
/// expected envelope all surface as errors the orchestrator answers with the
/// catalog fallback.
use crate::{error::AppResult, models::Credential};

pub mod openai;

pub use openai::OpenAiGenerator;

/// Sampling configuration sent with every generation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    /// Kept low: format adherence matters more than creativity
    pub temperature: f32,
    /// Enough for an analysis paragraph plus 15 short entries
    pub max_output_tokens: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.45,
            max_output_tokens: 1350,
            frequency_penalty: 1.0,
            presence_penalty: 0.7,
        }
    }
}

/// Trait for text-generation backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` as the user message and returns the raw reply text
    async fn generate(&self, prompt: &str, credential: &Credential) -> AppResult<String>;

    /// Generator name for logging and debugging
    fn name(&self) -> &'static str;
}
