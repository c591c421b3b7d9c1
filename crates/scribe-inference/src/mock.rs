//! Mock generation backend for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use scribe_core::{Error, GenerationBackend, Result};

/// Canned-response backend. Replies are consumed in order; the final reply
/// repeats once the queue drains.
pub struct MockBackend {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    failure: Option<String>,
}

impl MockBackend {
    /// Backend that answers with the given replies in order.
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|s| s.as_ref().to_string()).collect()),
            last: Mutex::new(None),
            failure: None,
        }
    }

    /// Backend whose every call fails with an inference error.
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if let Some(ref message) = self.failure {
            return Err(Error::Inference(message.clone()));
        }

        let mut replies = self.replies.lock().expect("mock lock");
        match replies.pop_front() {
            Some(reply) => {
                *self.last.lock().expect("mock lock") = Some(reply.clone());
                Ok(reply)
            }
            None => self
                .last
                .lock()
                .expect("mock lock")
                .clone()
                .ok_or_else(|| Error::Inference("mock backend has no replies".to_string())),
        }
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
