//! Prompt dispatch: one prompt in, one call out, one printable outcome back.
//!
//! Nothing here retries or keeps history. Every failure from the provider is folded into
//! [`Outcome::Failure`] so the caller never has to handle an error.

use crate::{
    attachment::Attachment,
    builder::GeminiBuilder,
    chat::{ChatMessage, ChatProvider},
    credential::{ApiKey, CredentialIntake, MISSING_KEY_WARNING},
    error::ChatError,
    preset::Preset,
};

/// What the user gets to see after submitting a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No key yet; nothing was sent
    Warning(String),
    /// Blank prompt; nothing was sent
    Skipped,
    /// Reply text exactly as returned
    Answer(String),
    /// Message of the failure raised by the call
    Failure(String),
}

/// Turns a key into a ready client.
pub type ProviderFactory =
    Box<dyn Fn(&ApiKey) -> Result<Box<dyn ChatProvider>, ChatError> + Send + Sync>;

/// Sends single prompts through a configured provider.
pub struct Dispatcher {
    provider: Box<dyn ChatProvider>,
}

impl Dispatcher {
    pub fn new(provider: Box<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Sends `prompt` as the only message and reports the result.
    ///
    /// Attachments go into the same message as extra parts ahead of the prompt.
    pub async fn dispatch(&self, prompt: &str, attachments: &[Attachment]) -> Outcome {
        if prompt.trim().is_empty() {
            return Outcome::Skipped;
        }

        let message = attachments
            .iter()
            .fold(ChatMessage::user(), |msg, attachment| {
                msg.attachment(attachment.framed())
            })
            .content(prompt)
            .build();
        let messages = [message];
        match self.provider.chat(&messages).await {
            Ok(response) => match response.text() {
                Some(text) => Outcome::Answer(text),
                None => Outcome::Failure("No text content in response".to_string()),
            },
            Err(e) => {
                log::debug!("{} request failed: {}", self.provider.model(), e);
                Outcome::Failure(e.to_string())
            }
        }
    }
}

/// A key field plus a prompt field, as one interactive session.
pub struct Session {
    preset: Preset,
    intake: CredentialIntake,
    factory: ProviderFactory,
    dispatcher: Option<Dispatcher>,
    attachments: Vec<Attachment>,
}

impl Session {
    /// Creates a session without a key; `factory` is called each time a key is entered.
    pub fn new<F>(preset: Preset, factory: F) -> Self
    where
        F: Fn(&ApiKey) -> Result<Box<dyn ChatProvider>, ChatError> + Send + Sync + 'static,
    {
        Self {
            preset,
            intake: CredentialIntake::new(),
            factory: Box::new(factory),
            dispatcher: None,
            attachments: Vec::new(),
        }
    }

    /// Creates a session that builds Gemini clients from `builder` plus the entered key.
    pub fn gemini(preset: Preset, builder: GeminiBuilder) -> Self {
        Self::new(preset, move |key: &ApiKey| {
            builder.clone().api_key(key.expose()).build()
        })
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn has_key(&self) -> bool {
        self.intake.is_present()
    }

    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }

    /// Adds a file to send with every later prompt.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Stores the key and prepares a client for it. A blank value removes both.
    ///
    /// When no client can be built the key is dropped as well.
    pub fn set_api_key(&mut self, raw: &str) -> Result<(), ChatError> {
        self.dispatcher = None;
        self.intake.submit(raw);
        if let Some(key) = self.intake.key() {
            match (self.factory)(key) {
                Ok(provider) => self.dispatcher = Some(Dispatcher::new(provider)),
                Err(e) => {
                    self.intake.clear();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Dispatches `prompt` if a key is present, otherwise returns the missing-key warning.
    pub async fn submit(&self, prompt: &str) -> Outcome {
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(prompt, &self.attachments).await,
            None => Outcome::Warning(MISSING_KEY_WARNING.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatResponse, ChatRole};
    use async_trait::async_trait;
    use std::fmt;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    #[derive(Debug)]
    struct TextReply(Option<String>);

    impl fmt::Display for TextReply {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0.clone().unwrap_or_default())
        }
    }

    impl ChatResponse for TextReply {
        fn text(&self) -> Option<String> {
            self.0.clone()
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        built: Arc<AtomicUsize>,
        sent: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    struct ScriptedProvider {
        recorder: Recorder,
        reply: Result<Option<String>, String>,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
        ) -> Result<Box<dyn ChatResponse>, ChatError> {
            self.recorder.sent.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(Box::new(TextReply(text.clone()))),
                Err(msg) => Err(ChatError::HttpError(msg.clone())),
            }
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn session(reply: Result<Option<String>, String>) -> (Session, Recorder) {
        let recorder = Recorder::default();
        let handle = recorder.clone();
        let session = Session::new(Preset::Tutor, move |_key: &ApiKey| {
            handle.built.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedProvider {
                recorder: handle.clone(),
                reply: reply.clone(),
            }) as Box<dyn ChatProvider>)
        });
        (session, recorder)
    }

    #[tokio::test]
    async fn without_a_key_nothing_is_sent() {
        let (mut session, recorder) = session(Ok(Some("unused".into())));

        assert_eq!(
            session.submit("what is 2+2?").await,
            Outcome::Warning(MISSING_KEY_WARNING.to_string())
        );

        session.set_api_key("   ").unwrap();
        assert!(!session.has_key());
        assert_eq!(
            session.submit("what is 2+2?").await,
            Outcome::Warning(MISSING_KEY_WARNING.to_string())
        );

        assert_eq!(recorder.built.load(Ordering::SeqCst), 0);
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_prompt_makes_exactly_one_call() {
        let (mut session, recorder) = session(Ok(Some("4".into())));
        session.set_api_key("AIza-test").unwrap();

        let outcome = session.submit("what is 2+2?").await;

        assert_eq!(outcome, Outcome::Answer("4".to_string()));
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 1);
        assert_eq!(sent[0][0].role, ChatRole::User);
        assert_eq!(sent[0][0].content, "what is 2+2?");
    }

    #[tokio::test]
    async fn prompts_are_sent_alone() {
        let (mut session, recorder) = session(Ok(Some("ok".into())));
        session.set_api_key("AIza-test").unwrap();

        session.submit("first").await;
        session.submit("second").await;

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], vec![ChatMessage::user().content("second").build()]);
    }

    #[tokio::test]
    async fn blank_prompt_is_skipped() {
        let (mut session, recorder) = session(Ok(Some("unused".into())));
        session.set_api_key("AIza-test").unwrap();

        assert_eq!(session.submit("").await, Outcome::Skipped);
        assert_eq!(session.submit(" \n ").await, Outcome::Skipped);
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_text_is_reported_not_raised() {
        let (mut session, _recorder) = session(Err("connection refused".into()));
        session.set_api_key("AIza-test").unwrap();

        match session.submit("hello").await {
            Outcome::Failure(msg) => assert!(msg.contains("connection refused"), "got {msg}"),
            other => panic!("expected failure, got {other:?}"),
        }

        // the session stays usable after a failure
        assert!(matches!(session.submit("again").await, Outcome::Failure(_)));
    }

    #[tokio::test]
    async fn answer_is_returned_verbatim() {
        let reply = "  **Answer:** $$x^2 + 1 = 0$$ has roots $x = \\pm i$\n<br>\n";
        let (mut session, _recorder) = session(Ok(Some(reply.into())));
        session.set_api_key("AIza-test").unwrap();

        assert_eq!(session.submit("solve").await, Outcome::Answer(reply.to_string()));
    }

    #[tokio::test]
    async fn empty_reply_is_a_failure() {
        let (mut session, _recorder) = session(Ok(None));
        session.set_api_key("AIza-test").unwrap();

        assert_eq!(
            session.submit("hello").await,
            Outcome::Failure("No text content in response".to_string())
        );
    }

    #[tokio::test]
    async fn new_key_rebuilds_the_client() {
        let (mut session, recorder) = session(Ok(Some("ok".into())));
        session.set_api_key("first").unwrap();
        session.set_api_key("second").unwrap();
        assert_eq!(recorder.built.load(Ordering::SeqCst), 2);

        session.set_api_key("").unwrap();
        assert!(session.dispatcher().is_none());
    }

    #[tokio::test]
    async fn attachments_travel_in_the_same_message() {
        let (mut session, recorder) = session(Ok(Some("x = 3".into())));
        session.set_api_key("AIza-test").unwrap();
        session.attach(Attachment::new("hw.txt", "Q1. 2x = 6"));
        session.attach(Attachment::new("notes.md", "   "));

        assert_eq!(
            session.submit("Solve Q1").await,
            Outcome::Answer("x = 3".to_string())
        );

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 1);
        assert_eq!(
            sent[0][0].attachments,
            vec![
                "[Content from Text File: hw.txt]\nQ1. 2x = 6",
                "[Content from Text File: notes.md]",
            ]
        );
        assert_eq!(sent[0][0].content, "Solve Q1");
    }

    #[tokio::test]
    async fn attachments_alone_do_not_make_a_prompt() {
        let (mut session, recorder) = session(Ok(Some("unused".into())));
        session.set_api_key("AIza-test").unwrap();
        session.attach(Attachment::new("hw.txt", "Q1. 2x = 6"));

        assert_eq!(session.submit("  ").await, Outcome::Skipped);
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn key_is_dropped_when_no_client_can_be_built() {
        let mut session = Session::new(Preset::Basic, |_key: &ApiKey| {
            Err(ChatError::InvalidRequest("bad base URL".to_string()))
        });

        assert!(session.set_api_key("AIza-test").is_err());
        assert!(!session.has_key());
        assert!(session.dispatcher().is_none());
        assert_eq!(
            session.submit("hello").await,
            Outcome::Warning(MISSING_KEY_WARNING.to_string())
        );
    }

    #[test]
    fn gemini_session_uses_the_preset_model() {
        let mut session = Session::gemini(
            Preset::Basic,
            GeminiBuilder::new().preset(Preset::Basic),
        );
        session.set_api_key("AIza-test").unwrap();
        assert_eq!(session.preset(), Preset::Basic);
        assert_eq!(session.dispatcher().map(Dispatcher::model), Some("gemini-pro"));
    }
}
