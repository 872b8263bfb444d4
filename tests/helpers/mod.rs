#![allow(dead_code)]

use async_trait::async_trait;
use muutos_chat::config::prompt::SystemPrompt;
use muutos_chat::llm::completion::{
    CompletionOutput,
    CompletionProvider,
    CompletionRequest,
    ProviderError,
};
use muutos_chat::proxy::{ CompletionProxy, ProxySettings };
use std::sync::Arc;
use std::sync::atomic::{ AtomicUsize, Ordering };

pub const TEST_SYSTEM_PROMPT: &str = "Answer from the Muutos documents only.";

pub enum MockReply {
    Text(String),
    Fail,
}

pub struct MockProvider {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self { reply: MockReply::Text(text.to_string()), calls: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { reply: MockReply::Fail, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn create_completion(
        &self,
        _request: &CompletionRequest
    ) -> Result<CompletionOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            MockReply::Text(text) => Ok(CompletionOutput { output_text: text.clone() }),
            MockReply::Fail =>
                Err(ProviderError::Api {
                    status: 401,
                    message: "Incorrect API key provided: sk-live-secret".to_string(),
                }),
        }
    }

    fn get_model(&self) -> String {
        "mock".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn proxy_with(provider: Arc<MockProvider>) -> Arc<CompletionProxy> {
    Arc::new(
        CompletionProxy::new(
            provider,
            Arc::new(SystemPrompt::new(TEST_SYSTEM_PROMPT)),
            ProxySettings::default()
        )
    )
}
