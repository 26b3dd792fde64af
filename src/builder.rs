//! Builder for configuring and instantiating the Gemini client.

use crate::{backends::google::Google, chat::ChatProvider, error::ChatError, preset::Preset};

/// Builder for configuring and instantiating a Gemini chat provider.
///
/// Provides a fluent interface for the key, model, system instruction and generation
/// parameters. A [`Preset`] fills in the model and system instruction; explicit calls
/// made afterwards override it.
#[derive(Clone, Default)]
pub struct GeminiBuilder {
    /// API key for authentication with the provider
    api_key: Option<String>,
    /// Base URL for API requests
    base_url: Option<String>,
    /// Model identifier/name to use
    model: Option<String>,
    /// Maximum tokens to generate in responses
    max_tokens: Option<u32>,
    /// Temperature parameter for controlling response randomness (0.0-1.0)
    temperature: Option<f32>,
    /// System instruction to guide model behavior
    system: Option<String>,
    /// Request timeout duration in seconds
    timeout_seconds: Option<u64>,
    /// Top-p (nucleus) sampling parameter
    top_p: Option<f32>,
    /// Top-k sampling parameter
    top_k: Option<u32>,
}

impl GeminiBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a preset's model and system instruction.
    ///
    /// A preset without an instruction clears any instruction set earlier.
    pub fn preset(mut self, preset: Preset) -> Self {
        self.model = Some(preset.model().to_string());
        self.system = preset.system_instruction().map(str::to_string);
        self
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL for API requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature for controlling response randomness (0.0-1.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the system instruction.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets the top-p (nucleus) sampling parameter.
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the top-k sampling parameter.
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Builds the configured client.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key, or a blank one, was provided.
    pub fn build_google(self) -> Result<Google, ChatError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ChatError::InvalidRequest("No API key provided for Google".to_string()))?;

        Ok(Google::new(
            api_key,
            self.model,
            self.base_url,
            self.max_tokens,
            self.temperature,
            self.timeout_seconds,
            self.system,
            self.top_p,
            self.top_k,
        ))
    }

    /// Builds the configured client behind the [`ChatProvider`] trait.
    pub fn build(self) -> Result<Box<dyn ChatProvider>, ChatError> {
        Ok(Box::new(self.build_google()?))
    }
}
