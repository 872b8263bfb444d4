pub mod cli;
pub mod client;
pub mod config;
pub mod llm;
pub mod models;
pub mod proxy;
pub mod server;

use cli::{ Args, ChatArgs, Command, ServeArgs };
use config::prompt::load_system_prompt;
use llm::LlmConfig;
use llm::completion::new_client as new_completion_client;
use log::info;
use proxy::{ CompletionProxy, ProxySettings };
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve_args) => serve(serve_args).await,
        Command::Chat(chat_args) => chat(chat_args).await,
    }
}

/// Builds the proxy from configuration. Fails before serving when the prompt
/// file or the API key is unusable.
pub fn build_proxy(args: &ServeArgs) -> Result<CompletionProxy, Box<dyn Error + Send + Sync>> {
    let system_prompt = load_system_prompt(&args.system_prompt_path)?;

    let llm_config = LlmConfig {
        api_key: Some(args.openai_api_key.clone()).filter(|k| !k.trim().is_empty()),
        completion_model: Some(args.model.clone()),
        base_url: Some(args.openai_base_url.clone()),
        timeout_secs: args.provider_timeout_secs,
    };
    let provider = new_completion_client(&llm_config)?;
    info!(
        "Completion client configured: Model={}, BaseURL={}",
        provider.get_model(),
        provider.get_base_url().as_deref().unwrap_or("adapter default")
    );

    let settings = ProxySettings {
        max_output_tokens: args.max_output_tokens,
        reasoning_effort: Some(args.reasoning_effort),
        vector_store_ids: args.vector_store_ids.clone(),
    };
    Ok(CompletionProxy::new(provider, system_prompt, settings))
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Route: {}", args.chat_route);
    info!("Model: {}", args.model);
    info!("Max Output Tokens: {}", args.max_output_tokens);
    info!("Reasoning Effort: {}", args.reasoning_effort);
    info!("Vector Stores: {}", args.vector_store_ids.join(", "));
    info!("System Prompt Path: {}", args.system_prompt_path);
    match args.provider_timeout_secs {
        Some(secs) => info!("Provider Timeout: {}s", secs),
        None => info!("Provider Timeout: none"),
    }
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let proxy = Arc::new(build_proxy(&args)?);
    let server = Server::new(proxy, args);
    server.run().await?;

    Ok(())
}

async fn chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Proxy URL: {}", args.proxy_url);
    client::repl::run(&args).await
}
