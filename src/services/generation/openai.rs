/// OpenAI-compatible chat completions client
///
/// API Flow:
/// POST {api_url}/v1/chat/completions with a fixed system message and the
/// prompt as the user message → choices[0].message.content
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Credential,
    services::{
        generation::{GenerationSettings, TextGenerator},
        prompt::SYSTEM_INSTRUCTION,
    },
};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: HttpClient,
    api_url: String,
    model: String,
    settings: GenerationSettings,
}

impl OpenAiGenerator {
    pub fn new(http_client: HttpClient, api_url: String, model: String) -> Self {
        Self {
            http_client,
            api_url,
            model,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_output_tokens,
            frequency_penalty: self.settings.frequency_penalty,
            presence_penalty: self.settings.presence_penalty,
        }
    }

    /// Pulls the first choice's message content out of a response body
    fn extract_text(body: &str) -> AppResult<String> {
        if body.trim().is_empty() {
            return Err(AppError::MalformedResponse(
                "empty response body".to_string(),
            ));
        }

        let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            AppError::MalformedResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let content = response
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                AppError::MalformedResponse(
                    "completion response missing choices[0].message.content".to_string(),
                )
            })?;

        if content.trim().is_empty() {
            return Err(AppError::MalformedResponse(
                "completion content is empty".to_string(),
            ));
        }

        Ok(content)
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, credential: &Credential) -> AppResult<String> {
        let payload = self.build_request(prompt);

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Completion request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let text = Self::extract_text(&body)?;

        tracing::info!(
            model = %self.model,
            reply_chars = text.len(),
            generator = "openai",
            "Completion received"
        );
        tracing::debug!(reply = %text, "Raw completion text");

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_generator() -> OpenAiGenerator {
        OpenAiGenerator::new(
            reqwest::Client::new(),
            "http://test.local/".to_string(),
            "gpt-4o-mini".to_string(),
        )
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            create_test_generator().endpoint(),
            "http://test.local/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_payload() {
        let generator = create_test_generator();
        let payload = serde_json::to_value(generator.build_request("Recommend films")).unwrap();

        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], SYSTEM_INSTRUCTION);
        assert_eq!(payload["messages"][1]["role"], "user");
        assert_eq!(payload["messages"][1]["content"], "Recommend films");
        assert_eq!(payload["max_tokens"], 1350);
        assert!((payload["temperature"].as_f64().unwrap() - 0.45).abs() < 1e-6);
        assert!((payload["frequency_penalty"].as_f64().unwrap() - 1.0).abs() < 1e-6);
        assert!((payload["presence_penalty"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_custom_settings() {
        let generator = create_test_generator().with_settings(GenerationSettings {
            temperature: 0.2,
            max_output_tokens: 900,
            ..GenerationSettings::default()
        });
        let payload = serde_json::to_value(generator.build_request("x")).unwrap();
        assert_eq!(payload["max_tokens"], 900);
    }

    #[test]
    fn test_extract_text_success() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "1. Heat (1995)"}}]}"#;
        assert_eq!(
            OpenAiGenerator::extract_text(body).unwrap(),
            "1. Heat (1995)"
        );
    }

    #[test]
    fn test_extract_text_malformed_envelopes() {
        for body in [
            "",
            "not json",
            r#"{"id": "chatcmpl-1"}"#,
            r#"{"choices": []}"#,
            r#"{"choices": [{"index": 0}]}"#,
            r#"{"choices": [{"message": {"role": "assistant"}}]}"#,
            r#"{"choices": [{"message": {"content": "   "}}]}"#,
        ] {
            let result = OpenAiGenerator::extract_text(body);
            assert!(
                matches!(result, Err(AppError::MalformedResponse(_))),
                "expected malformed for {:?}",
                body
            );
        }
    }
}
