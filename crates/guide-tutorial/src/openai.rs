//! OpenAI-compatible chat completion client
//!
//! Sends one non-streaming `/chat/completions` request per generation with
//! bearer auth. JSON mode maps to `response_format: {"type": "json_object"}`.

use crate::error::ModelError;
use crate::model::{GenerationRequest, GenerativeModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection and sampling settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Endpoint root, without `/chat/completions`
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token cap
    pub max_tokens: u32,
    /// Request JSON-only responses
    pub json_mode: bool,
    /// Bearer token, never serialized
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            json_mode: true,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("json_mode", &self.json_mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ModelSettings {
    /// Set model name
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set endpoint root
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set bearer token
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Full completions URL
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion model
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: Client,
    settings: ModelSettings,
}

impl OpenAiChatModel {
    /// Create client from settings
    ///
    /// # Errors
    /// `ModelError::Config` if no API key is set or the HTTP client cannot be built
    pub fn new(settings: ModelSettings) -> Result<Self, ModelError> {
        if settings.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ModelError::Config("no API key configured".to_string()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| ModelError::Config(e.to_string()))?;

        Ok(Self { client, settings })
    }

    /// Settings in use
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn body<'a>(&'a self, request: &GenerationRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: (request.json_mode && self.settings.json_mode).then_some(
                ResponseFormat {
                    format_type: "json_object",
                },
            ),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeModel for OpenAiChatModel {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ModelError> {
        let url = self.settings.completions_url();
        let api_key = self.settings.api_key.as_deref().unwrap_or_default();

        tracing::debug!(model = %self.settings.model, url = %url, "sending chat completion");
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        tracing::debug!(chars = content.len(), "chat completion received");
        Ok(content)
    }
}
