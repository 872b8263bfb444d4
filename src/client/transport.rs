use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::models::chat::ChatRequest;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid proxy url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("proxy returned status {0}")]
    Status(u16),
    #[error("proxy response has no message")]
    MissingMessage,
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Sends one utterance to the proxy and returns the reply text.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, utterance: &str) -> Result<String, ClientError>;
}

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    endpoint: Url,
    health_url: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)?;
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let health_url = endpoint.join("/health")?;
        Ok(Self { http: builder.build()?, endpoint, health_url })
    }

    /// Overrides the health check URL. Needed when the proxy sits behind a path
    /// prefix, since the default is `/health` at the root of the endpoint's origin.
    pub fn with_health_url(mut self, health_url: &str) -> Result<Self, ClientError> {
        self.health_url = Url::parse(health_url)?;
        Ok(self)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    pub async fn health(&self) -> Result<(), ClientError> {
        let resp = self.http.get(self.health_url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, utterance: &str) -> Result<String, ClientError> {
        let body = ChatRequest { message: Some(utterance.to_string()) };
        let resp = self.http.post(self.endpoint.clone()).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        resp.json::<ReplyBody>().await?.message.ok_or(ClientError::MissingMessage)
    }
}
