//! Scripted chat model for tests and offline runs

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{ChatModel, LlmError};
use super::types::Message;

/// Replays queued replies in order and records every transcript it receives.
///
/// When the script runs dry the mock returns `LlmError::InvalidResponse`,
/// unless a fallback reply was set with [`MockChatModel::repeating`].
#[derive(Debug, Default)]
pub struct MockChatModel {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Option<String>,
    transcripts: Mutex<Vec<Vec<Message>>>,
}

impl MockChatModel {
    /// Mock that returns `responses` in order
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            ..Default::default()
        }
    }

    /// Mock that returns the same reply forever
    pub fn repeating(response: impl Into<String>) -> Self {
        Self {
            fallback: Some(response.into()),
            ..Default::default()
        }
    }

    /// Queue an error after the replies queued so far
    pub fn then_fail(self, error: LlmError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Number of times the model was invoked
    pub fn calls(&self) -> usize {
        lock(&self.transcripts).len()
    }

    /// Every transcript the model was sent, in call order
    pub fn transcripts(&self) -> Vec<Vec<Message>> {
        lock(&self.transcripts).clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn chat_with_history(&self, messages: &[Message]) -> Result<String, LlmError> {
        lock(&self.transcripts).push(messages.to_vec());

        match lock(&self.script).pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| LlmError::InvalidResponse("mock script exhausted".to_string())),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
