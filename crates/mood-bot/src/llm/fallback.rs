use std::sync::Arc;

use super::{ChatMessage, CompletionProvider};
use crate::error::ProviderError;

pub const SYSTEM_PROMPT: &str = "Ты дружелюбный помощник, советующий, как провести досуг в городе. \
Отвечай кратко: не больше 4 пунктов.";

/// Answers messages that matched no category with a short leisure suggestion.
pub struct ConversationalFallback {
    provider: Arc<dyn CompletionProvider>,
}

impl ConversationalFallback {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn suggest(&self, text: &str) -> Result<String, ProviderError> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(text)];
        self.provider.complete(&messages).await
    }
}
