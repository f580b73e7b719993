//! Test doubles for the generation-client boundary.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gemini_client::{GenerateText, GenerationError};

/// Replays a fixed script of generation results and records every prompt it
/// was asked. Panics if asked more often than the script allows.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// One successful generation returning `reply`.
    pub fn replying(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    /// One failed generation carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(GenerationError::Api(message.to_string()))])
    }

    /// Every prompt seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerateText for ScriptedClient {
    async fn generate(&self, full_prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(full_prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted client ran out of replies")
    }
}
