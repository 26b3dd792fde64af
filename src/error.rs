use std::fmt;

/// Error types that can occur when talking to the Gemini API.
#[derive(Debug)]
pub enum ChatError {
    /// HTTP request/response errors
    HttpError(String),
    /// Authentication and authorization errors
    AuthError(String),
    /// Invalid request parameters or format
    InvalidRequest(String),
    /// Errors returned by the provider
    ProviderError(String),
    /// The response could not be decoded
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    JsonError(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::HttpError(e) => write!(f, "HTTP Error: {}", e),
            ChatError::AuthError(e) => write!(f, "Auth Error: {}", e),
            ChatError::InvalidRequest(e) => write!(f, "Invalid Request: {}", e),
            ChatError::ProviderError(e) => write!(f, "Provider Error: {}", e),
            ChatError::ResponseFormatError {
                message,
                raw_response,
            } => write!(
                f,
                "Response Format Error: {}. Raw response: {}",
                message, raw_response
            ),
            ChatError::JsonError(e) => write!(f, "JSON Parse Error: {}", e),
        }
    }
}

impl std::error::Error for ChatError {}

/// Converts reqwest HTTP errors into ChatErrors
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest embeds the request URL, which carries the key as a query parameter
        ChatError::HttpError(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_the_inner_message() {
        let err = ChatError::ProviderError("Gemini API Error (400): bad key".into());
        assert_eq!(err.to_string(), "Provider Error: Gemini API Error (400): bad key");
    }

    #[test]
    fn json_errors_carry_position() {
        let err: ChatError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        let text = err.to_string();
        assert!(text.starts_with("JSON Parse Error:"), "got {text}");
        assert!(text.contains("line 1"), "got {text}");
    }
}
