//! Google Gemini API client.
//!
//! Sends conversations to the `generateContent` endpoint and returns the text of the
//! first candidate. The API key travels as the `key` query parameter.
//!
//! # Example
//! ```no_run
//! use gemini_chat::backends::google::Google;
//! use gemini_chat::chat::{ChatMessage, ChatProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Google::new(
//!         "your-api-key",
//!         Some("gemini-1.5-pro".to_string()),
//!         None, // Default base URL
//!         None, // Max tokens
//!         None, // Temperature
//!         None, // No timeout
//!         Some("Use LaTeX for math.".to_string()),
//!         None, // Default top_p
//!         None, // Default top_k
//!     );
//!
//!     let messages = vec![ChatMessage::user().content("Integrate x^2").build()];
//!     let response = client.chat(&messages).await.unwrap();
//!     println!("{}", response);
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, Usage},
    error::ChatError,
};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Client for interacting with Google's Gemini API.
pub struct Google {
    /// API key for authentication with Google's API
    pub api_key: String,
    /// Model identifier (e.g. "gemini-1.5-pro")
    pub model: String,
    /// Base URL of the REST API, without a trailing `/models`
    pub base_url: String,
    /// Maximum number of tokens to generate in responses
    pub max_tokens: Option<u32>,
    /// Sampling temperature between 0.0 and 1.0
    pub temperature: Option<f32>,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
    /// Optional system instruction sent with every request
    pub system: Option<String>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
    /// Top-k sampling parameter
    pub top_k: Option<u32>,
    client: Client,
}

/// Request body for `generateContent`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleChatRequest<'a> {
    contents: Vec<GoogleChatContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GoogleSystemInstruction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GoogleGenerationConfig>,
}

/// Individual message in a conversation
#[derive(Serialize)]
struct GoogleChatContent<'a> {
    /// Role of the message sender ("user" or "model")
    role: &'a str,
    parts: Vec<GoogleContentPart<'a>>,
}

#[derive(Serialize)]
struct GoogleSystemInstruction<'a> {
    parts: Vec<GoogleContentPart<'a>>,
}

#[derive(Serialize)]
struct GoogleContentPart<'a> {
    text: &'a str,
}

/// Configuration parameters for text generation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

/// Response from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleChatResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GooglePromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GoogleUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCandidate {
    #[serde(default)]
    content: Option<GoogleResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GooglePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl ChatResponse for GoogleChatResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn usage(&self) -> Option<Usage> {
        self.usage_metadata.as_ref().map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
    }
}

impl fmt::Display for GoogleChatResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl GoogleChatResponse {
    /// Rejects replies that carry no usable text, naming the reason when Gemini gives one.
    fn ensure_text(self) -> Result<Self, ChatError> {
        if self.candidates.is_empty() {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref());
            return Err(match reason {
                Some(reason) => {
                    ChatError::ProviderError(format!("Prompt blocked by Gemini: {reason}"))
                }
                None => {
                    ChatError::ProviderError("No candidates returned by Google".to_string())
                }
            });
        }

        if self.text().is_none() {
            let finish = self.candidates[0].finish_reason.as_deref();
            return Err(ChatError::ProviderError(match finish {
                Some(reason) => format!("No text content in response (finish reason: {reason})"),
                None => "No text content in response".to_string(),
            }));
        }

        Ok(self)
    }
}

impl Google {
    /// Creates a new Google Gemini client with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google API key for authentication
    /// * `model` - Model identifier (defaults to [`DEFAULT_MODEL`])
    /// * `base_url` - REST base URL (defaults to [`DEFAULT_BASE_URL`])
    /// * `max_tokens` - Maximum tokens in response
    /// * `temperature` - Sampling temperature between 0.0 and 1.0
    /// * `timeout_seconds` - Request timeout in seconds, none by default
    /// * `system` - System instruction sent with every request
    /// * `top_p` - Top-p sampling parameter
    /// * `top_k` - Top-k sampling parameter
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
        system: Option<String>,
        top_p: Option<f32>,
        top_k: Option<u32>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens,
            temperature,
            timeout_seconds,
            system,
            top_p,
            top_k,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> GoogleChatRequest<'a> {
        let contents = messages
            .iter()
            .map(|msg| GoogleChatContent {
                role: match msg.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                },
                parts: msg
                    .attachments
                    .iter()
                    .chain(std::iter::once(&msg.content))
                    .map(|text| GoogleContentPart { text: text.as_str() })
                    .collect(),
            })
            .collect();

        let system_instruction = self.system.as_deref().map(|text| GoogleSystemInstruction {
            parts: vec![GoogleContentPart { text }],
        });

        // An empty generationConfig object is rejected by the API
        let generation_config = if self.max_tokens.is_none()
            && self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
        {
            None
        } else {
            Some(GoogleGenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
            })
        };

        GoogleChatRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }
}

#[async_trait]
impl ChatProvider for Google {
    /// Sends a `generateContent` request to Gemini.
    ///
    /// # Arguments
    ///
    /// * `messages` - Slice of chat messages representing the conversation
    ///
    /// # Returns
    ///
    /// The model's response or an error
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, ChatError> {
        if self.api_key.trim().is_empty() {
            return Err(ChatError::AuthError("Missing Google API key".to_string()));
        }

        let body = self.build_request(messages);

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Google request payload: {}", json);
            }
        }

        let mut request = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let resp = request.send().await?;

        log::debug!("Google HTTP status: {}", resp.status());

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await?;
            return Err(ChatError::ProviderError(format!(
                "Gemini API Error ({status}): {error_text}"
            )));
        }

        let resp_text = resp.text().await?;
        let json_resp: GoogleChatResponse =
            serde_json::from_str(&resp_text).map_err(|e| ChatError::ResponseFormatError {
                message: format!("Failed to decode Google API response: {e}"),
                raw_response: resp_text.clone(),
            })?;

        let json_resp = json_resp.ensure_text()?;
        if let Some(usage) = json_resp.usage() {
            log::debug!(
                "Google usage: prompt={} completion={} total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(Box::new(json_resp))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
