use crate::config::prompt::SystemPrompt;
use crate::llm::ReasoningEffort;
use crate::llm::completion::{ CompletionProvider, CompletionRequest, Tool, ToolChoice };

use log::{ debug, error, info, warn };
use std::sync::Arc;

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
pub const FALLBACK_ANSWER: &str = "I'm sorry, I don't have an answer for that.";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{}", MESSAGE_REQUIRED)]
    BadRequest,
    /// Detail is logged where the failure happens; only the generic text leaves the proxy.
    #[error("{}", INTERNAL_SERVER_ERROR)]
    Internal,
}

#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub max_output_tokens: u32,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub vector_store_ids: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            max_output_tokens: 5000,
            reasoning_effort: Some(ReasoningEffort::Low),
            vector_store_ids: vec![crate::cli::DEFAULT_VECTOR_STORE_ID.to_string()],
        }
    }
}

/// Stateless request handler: one utterance in, one reply out.
#[derive(Clone)]
pub struct CompletionProxy {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: Arc<SystemPrompt>,
    settings: ProxySettings,
}

impl CompletionProxy {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        system_prompt: Arc<SystemPrompt>,
        settings: ProxySettings
    ) -> Self {
        Self { provider, system_prompt, settings }
    }

    fn build_request(&self, utterance: &str) -> CompletionRequest {
        CompletionRequest {
            instructions: self.system_prompt.as_str().to_string(),
            input: utterance.to_string(),
            max_output_tokens: self.settings.max_output_tokens,
            reasoning_effort: self.settings.reasoning_effort,
            tool_choice: ToolChoice::Required,
            tools: vec![Tool::FileSearch {
                vector_store_ids: self.settings.vector_store_ids.clone(),
            }],
        }
    }

    pub async fn respond(&self, message: Option<&str>) -> Result<String, ProxyError> {
        let utterance = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => {
                warn!("Rejected chat request without a message");
                return Err(ProxyError::BadRequest);
            }
        };

        let request = self.build_request(utterance);
        match self.provider.create_completion(&request).await {
            Ok(output) => {
                info!(
                    "Completion received from {}: {} chars",
                    self.provider.get_model(),
                    output.output_text.len()
                );
                debug!("Completion text: {}", output.output_text);
                if output.output_text.trim().is_empty() {
                    Ok(FALLBACK_ANSWER.to_string())
                } else {
                    Ok(output.output_text)
                }
            }
            Err(e) => {
                error!("Completion provider error: {}", e);
                Err(ProxyError::Internal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::completion::{ CompletionOutput, ProviderError };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        reply: Result<String, u16>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingProvider {
        fn replying(text: &str) -> Self {
            Self { reply: Ok(text.to_string()), seen: Mutex::new(Vec::new()) }
        }

        fn failing(status: u16) -> Self {
            Self { reply: Err(status), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        async fn create_completion(
            &self,
            request: &CompletionRequest
        ) -> Result<CompletionOutput, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(CompletionOutput { output_text: text.clone() }),
                Err(status) =>
                    Err(ProviderError::Api {
                        status: *status,
                        message: "upstream exploded: secret detail".to_string(),
                    }),
            }
        }

        fn get_model(&self) -> String {
            "test-model".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    fn proxy_with(provider: Arc<RecordingProvider>) -> CompletionProxy {
        CompletionProxy::new(
            provider,
            Arc::new(SystemPrompt::new("You are helpful.")),
            ProxySettings::default()
        )
    }

    #[tokio::test]
    async fn forwards_utterance_with_fixed_instructions_and_file_search() {
        let provider = Arc::new(RecordingProvider::replying("Opening hours are 9-17."));
        let proxy = proxy_with(provider.clone());

        let reply = proxy.respond(Some("When are you open?")).await.unwrap();
        assert_eq!(reply, "Opening hours are 9-17.");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let req = &seen[0];
        assert_eq!(req.instructions, "You are helpful.");
        assert_eq!(req.input, "When are you open?");
        assert_eq!(req.max_output_tokens, 5000);
        assert_eq!(req.reasoning_effort, Some(ReasoningEffort::Low));
        assert_eq!(req.tool_choice, ToolChoice::Required);
        assert_eq!(req.tools, vec![Tool::FileSearch {
            vector_store_ids: vec![crate::cli::DEFAULT_VECTOR_STORE_ID.to_string()],
        }]);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_calling_provider() {
        let provider = Arc::new(RecordingProvider::replying("unused"));
        let proxy = proxy_with(provider.clone());

        for input in [None, Some(""), Some("   \n\t")] {
            assert!(matches!(proxy.respond(input).await, Err(ProxyError::BadRequest)));
        }
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_output_becomes_fallback() {
        for output in ["", "  \n"] {
            let proxy = proxy_with(Arc::new(RecordingProvider::replying(output)));
            assert_eq!(proxy.respond(Some("hello")).await.unwrap(), FALLBACK_ANSWER);
        }
    }

    #[tokio::test]
    async fn provider_failure_is_opaque() {
        let proxy = proxy_with(Arc::new(RecordingProvider::failing(503)));
        let err = proxy.respond(Some("hello")).await.unwrap_err();
        assert!(matches!(err, ProxyError::Internal));
        assert_eq!(err.to_string(), INTERNAL_SERVER_ERROR);
    }
}
