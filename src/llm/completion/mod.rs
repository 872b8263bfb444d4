pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::Arc;

use super::{ LlmConfig, ReasoningEffort };
use self::openai::OpenAIResponsesClient;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Provider-side tool the model may (or must) call while answering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    FileSearch {
        vector_store_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Required,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub instructions: String,
    pub input: String,
    pub max_output_tokens: u32,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub tool_choice: ToolChoice,
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOutput {
    pub output_text: String,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn create_completion(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionOutput, ProviderError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn CompletionProvider>, Box<dyn StdError + Send + Sync>> {
    let client = OpenAIResponsesClient::from_config(config)?;
    Ok(Arc::new(client))
}
