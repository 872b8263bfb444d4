use clap::{ Parser, Subcommand };

use crate::llm::ReasoningEffort;

/// Vector store consulted by the file_search tool unless overridden.
pub const DEFAULT_VECTOR_STORE_ID: &str = "vs_68dfabf5258c81918d4770afd9dfddff";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the completion proxy HTTP server.
    Serve(ServeArgs),
    /// Open an interactive chat session against a running proxy.
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Route the chat endpoint is mounted on.
    #[arg(long, env = "CHAT_ROUTE", default_value = "/api/openai")]
    pub chat_route: String,

    // --- Completion Provider Args ---
    /// API Key for the OpenAI Responses API. Startup fails without it.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Base URL of the OpenAI API (the /v1/responses path is appended).
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    /// Model name used for completions.
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-5-nano")]
    pub model: String,

    /// Upper bound on generated tokens per reply.
    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value = "5000")]
    pub max_output_tokens: u32,

    /// Reasoning effort hint (minimal, low, medium, high).
    #[arg(long, env = "REASONING_EFFORT", default_value = "low")]
    pub reasoning_effort: ReasoningEffort,

    /// Vector store id(s) the provider must search before answering.
    #[arg(
        long = "vector-store-id",
        env = "VECTOR_STORE_IDS",
        value_delimiter = ',',
        default_value = DEFAULT_VECTOR_STORE_ID
    )]
    pub vector_store_ids: Vec<String>,

    /// Path to the plain-text system instruction file.
    #[arg(long, env = "SYSTEM_PROMPT_PATH", default_value = "data/system_prompt.txt")]
    pub system_prompt_path: String,

    /// Optional timeout in seconds for a single provider call. No timeout when unset.
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS")]
    pub provider_timeout_secs: Option<u64>,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Full URL of the proxy chat endpoint.
    #[arg(long, env = "PROXY_URL", default_value = "http://127.0.0.1:3000/api/openai")]
    pub proxy_url: String,

    /// Health check URL. Defaults to /health at the root of the proxy URL's origin.
    #[arg(long, env = "PROXY_HEALTH_URL")]
    pub health_url: Option<String>,

    /// Optional timeout in seconds for each request to the proxy.
    #[arg(long, env = "CHAT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}
