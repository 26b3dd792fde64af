//! Text files sent along with a prompt.
//!
//! Each file becomes one extra text part of the user message, headed by its name so the
//! model can tell the sources apart.

use std::{fs, path::Path};

use crate::error::ChatError;

/// A text file whose contents accompany every prompt of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    text: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Reads `path` as UTF-8 text, named after its final path component.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidRequest`] when the file cannot be read or is not text.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ChatError::InvalidRequest(format!("Cannot attach {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("Attached {} ({} bytes)", name, text.len());
        Ok(Self::new(name, text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part sent to the model: a header naming the file, then its contents.
    pub fn framed(&self) -> String {
        format!("\n[Content from Text File: {}]\n{}\n", self.name, self.text)
    }
}
