use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod config;
mod error;
mod handlers;
mod jobs;
mod middleware;
mod openai_client;
mod veo_client;
mod youtube_client;

use config::Config;

/// Shared application state: configuration plus the external-service
/// clients, each present only when its credentials are configured.
pub struct AppState {
    pub config: Config,
    pub veo_client: Option<veo_client::VeoClient>,
    pub openai_client: Option<openai_client::OpenAiClient>,
    pub youtube_client: Option<youtube_client::YouTubeClient>,
    pub job_manager: jobs::SharedJobManager,
}

impl AppState {
    /// Build clients from the config. Missing optional keys disable the
    /// corresponding feature instead of failing startup.
    pub fn from_config(config: Config) -> Self {
        let veo_client = match config.google_api_key.clone() {
            Some(api_key) => {
                tracing::info!("Initializing Veo video generation client...");
                Some(veo_client::VeoClient::new(api_key))
            }
            None => {
                tracing::warn!("GOOGLE_API_KEY not found. Video generation will be disabled.");
                None
            }
        };

        let openai_client = match config.openai_api_key.clone() {
            Some(api_key) => {
                tracing::info!("Initializing OpenAI metadata client (gpt-4o-mini)...");
                Some(openai_client::OpenAiClient::new(api_key))
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not found. Using default video metadata.");
                None
            }
        };

        let youtube_client = match (
            config.youtube_client_id.clone(),
            config.youtube_client_secret.clone(),
        ) {
            (Some(client_id), Some(client_secret)) => {
                tracing::info!("Initializing YouTube Data API client...");
                Some(youtube_client::YouTubeClient::new(
                    client_id,
                    client_secret,
                    config.youtube_redirect_uri.clone(),
                ))
            }
            _ => {
                tracing::warn!(
                    "YouTube OAuth credentials not complete. Uploads will run in demo mode."
                );
                tracing::info!(
                    "To enable uploads, set: YOUTUBE_CLIENT_ID, YOUTUBE_CLIENT_SECRET, YOUTUBE_REFRESH_TOKEN"
                );
                None
            }
        };

        if config.youtube_refresh_token.is_none() && youtube_client.is_some() {
            tracing::warn!(
                "YOUTUBE_REFRESH_TOKEN not set. Visit /api/auth/url to authorize and obtain one."
            );
        }

        Self {
            config,
            veo_client,
            openai_client,
            youtube_client,
            job_manager: Arc::new(jobs::JobManager::new()),
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();
    let shared_state = Arc::new(AppState::from_config(config));

    let app = Router::new()
        .merge(handlers::generate::routes())
        .merge(handlers::upload::routes())
        .merge(handlers::auth::routes())
        .merge(handlers::jobs::routes())
        .route("/api/status", axum::routing::get(api_status))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state));

    tracing::info!("🎬 Shorts Pilot listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, fmt, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,shorts_pilot=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,shorts_pilot=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

async fn api_status(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Json<serde_json::Value> {
    use serde_json::json;

    let veo_status = if state.veo_client.is_some() { "configured" } else { "not_configured" };
    let openai_status = if state.openai_client.is_some() { "configured" } else { "not_configured" };
    let youtube_status = if state.config.youtube_upload_credentials().is_some() {
        "configured"
    } else {
        "demo_mode"
    };

    axum::response::Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "veo_generation": veo_status,
            "openai_metadata": openai_status,
            "youtube_upload": youtube_status
        },
        "jobs_in_memory": state.job_manager.list().await.len(),
        "endpoints": {
            "generate": "/api/generate",
            "upload": "/api/upload",
            "jobs": "/api/jobs",
            "auth": "/api/auth/url",
            "status": "/api/status"
        }
    }))
}
