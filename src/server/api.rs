use crate::cli::ServeArgs;
use crate::models::chat::{ ChatRequest, ChatResponse, ErrorResponse };
use crate::proxy::{ CompletionProxy, ProxyError };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Clone)]
struct AppState {
    proxy: Arc<CompletionProxy>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::BadRequest => StatusCode::BAD_REQUEST,
            ProxyError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

pub fn router(proxy: Arc<CompletionProxy>, chat_route: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let chat_route = if chat_route.starts_with('/') {
        chat_route.to_string()
    } else {
        format!("/{}", chat_route)
    };

    Router::new()
        .route(&chat_route, post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(AppState { proxy })
}

pub async fn start_http_server(
    proxy: Arc<CompletionProxy>,
    args: &ServeArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args.server_addr.parse::<SocketAddr>()?;
    let app = router(proxy, &args.chat_route);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => {
                return Err("TLS enabled but --tls-cert-path or --tls-key-path is missing".into());
            }
        };

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("HTTPS server listening on: https://{}{}", addr, args.chat_route);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
        })?;
        info!("HTTP server listening on: http://{}{}", addr, args.chat_route);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<ChatRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse chat request body: {}", e);
            return ProxyError::Internal.into_response();
        }
    };

    match state.proxy.respond(request.message.as_deref()).await {
        Ok(message) => (StatusCode::OK, Json(ChatResponse { message })).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
