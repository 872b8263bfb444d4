use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::time::Duration;

use super::{ CompletionOutput, CompletionProvider, CompletionRequest, ProviderError, Tool, ToolChoice };
use crate::llm::{ LlmConfig, ReasoningEffort };

const DEFAULT_MODEL: &str = "gpt-5-nano";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI Responses API (`POST /v1/responses`).
pub struct OpenAIResponsesClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<OpenAIReasoning>,
    tool_choice: ToolChoice,
    tools: &'a [Tool],
}

#[derive(Serialize)]
struct OpenAIReasoning {
    effort: ReasoningEffort,
}

#[derive(Deserialize)]
struct OpenAIResponsesResponse {
    #[serde(default)]
    output: Vec<OpenAIOutputItem>,
}

#[derive(Deserialize)]
struct OpenAIOutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<OpenAIContentPart>,
}

#[derive(Deserialize)]
struct OpenAIContentPart {
    #[serde(rename = "type")]
    part_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIErrorEnvelope {
    error: OpenAIErrorBody,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    message: String,
}

impl OpenAIResponsesResponse {
    /// Concatenates every `output_text` part of every message item.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.part_type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

impl OpenAIResponsesClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if api_key.trim().is_empty() {
            return Err("OpenAI API key is required".into());
        }
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, model, base_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "OpenAI API key is required".to_string())?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    fn responses_url(&self) -> String {
        if self.base_url.ends_with("/v1/responses") {
            self.base_url.clone()
        } else {
            format!("{}/v1/responses", self.base_url.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIResponsesClient {
    async fn create_completion(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionOutput, ProviderError> {
        let req = OpenAIResponsesRequest {
            model: &self.model,
            instructions: &request.instructions,
            input: &request.input,
            max_output_tokens: request.max_output_tokens,
            reasoning: request.reasoning_effort.map(|effort| OpenAIReasoning { effort }),
            tool_choice: request.tool_choice,
            tools: &request.tools,
        };

        let resp = self.http.post(self.responses_url()).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json
                ::from_str::<OpenAIErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Api { status: status.as_u16(), message });
        }

        let body = resp.text().await?;
        debug!("OpenAI responses raw body: {}", body);
        let parsed: OpenAIResponsesResponse = serde_json
            ::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(CompletionOutput { output_text: parsed.output_text() })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
