//! Terminal chat front-end for Google Gemini.
//!
//! # Overview
//! The crate reads an API key and a prompt, sends the prompt to Gemini's
//! `generateContent` endpoint and prints the returned text. Two presets are provided:
//!
//! - `tutor`: math & science tutor with a fixed system instruction; math spans in the
//!   reply are highlighted
//! - `basic`: general assistant with no preamble and plain output
//!
//! Each prompt is sent on its own. There is no history, retry or caching.
//!
//! # Example
//! ```no_run
//! use gemini_chat::{builder::GeminiBuilder, dispatcher::{Outcome, Session}, preset::Preset};
//!
//! #[tokio::main]
//! async fn main() {
//!     let preset = Preset::Tutor;
//!     let mut session = Session::gemini(preset, GeminiBuilder::new().preset(preset));
//!     session.set_api_key("your-api-key").unwrap();
//!
//!     match session.submit("Differentiate x^3").await {
//!         Outcome::Answer(text) => println!("{}", preset.renderer().render(&text)),
//!         Outcome::Failure(msg) => eprintln!("Error: {msg}"),
//!         Outcome::Warning(msg) => eprintln!("{msg}"),
//!         Outcome::Skipped => {}
//!     }
//! }
//! ```

// Re-export for convenience
pub use async_trait::async_trait;

/// Text files sent along with prompts
pub mod attachment;

/// Gemini API client
pub mod backends;

/// Builder pattern for configuring the Gemini client
pub mod builder;

/// Chat message model and provider traits
pub mod chat;

/// In-memory API key handling
pub mod credential;

/// Prompt dispatch and the interactive session
pub mod dispatcher;

/// Error types and handling
pub mod error;

/// Tutor and basic front-end presets
pub mod preset;

/// Terminal rendering of replies
pub mod render;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
