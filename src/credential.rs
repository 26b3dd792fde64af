use std::fmt;

/// Warning shown whenever a prompt is submitted before a key has been entered.
pub const MISSING_KEY_WARNING: &str = "Please enter your API Key to start.";

/// An API key held in memory for the lifetime of a session.
///
/// The value is never written anywhere and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw value, or returns `None` when it is blank.
    ///
    /// Surrounding whitespace (e.g. a pasted trailing newline) is dropped; nothing else is
    /// checked.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The secret itself, for handing to a client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Holds whatever was last typed into the masked key field.
#[derive(Debug, Default)]
pub struct CredentialIntake {
    key: Option<ApiKey>,
}

impl CredentialIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held key. A blank value clears it.
    pub fn submit(&mut self, raw: &str) {
        self.key = ApiKey::new(raw);
    }

    pub fn key(&self) -> Option<&ApiKey> {
        self.key.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.key.is_some()
    }

    pub fn clear(&mut self) {
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_not_keys() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new(" \t\n").is_none());
        assert_eq!(ApiKey::new(" AIza-123\n").unwrap().expose(), "AIza-123");
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let key = ApiKey::new("AIza-secret").unwrap();
        let intake = CredentialIntake { key: Some(key.clone()) };
        assert_eq!(format!("{key:?}"), "ApiKey(****)");
        assert!(!format!("{intake:?}").contains("AIza-secret"));
    }

    #[test]
    fn submit_replaces_and_blank_clears() {
        let mut intake = CredentialIntake::new();
        assert!(!intake.is_present());

        intake.submit("first");
        intake.submit("second");
        assert_eq!(intake.key().map(ApiKey::expose), Some("second"));

        intake.submit("   ");
        assert!(!intake.is_present());

        intake.submit("third");
        intake.clear();
        assert!(intake.key().is_none());
    }
}
