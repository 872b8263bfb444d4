pub mod api;

use crate::cli::ServeArgs;
use crate::proxy::CompletionProxy;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    proxy: Arc<CompletionProxy>,
    args: ServeArgs,
}

impl Server {
    pub fn new(proxy: Arc<CompletionProxy>, args: ServeArgs) -> Self {
        Self { proxy, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(self.proxy.clone(), &self.args).await
    }
}
