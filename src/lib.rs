//! eli5cast - "Explain like I'm 5" for Farcaster casts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Session endpoints (paste, language, regenerate, reset)   │
//! │  - Health / metrics                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Session state machine (last request wins)                │
//! │  - Cast resolution, quote merging                           │
//! │  - Explanation generation                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Upstream Clients                         │
//! │  - Cast indexing API (Neynar)                               │
//! │  - Generation API (OpenAI chat completions)                 │
//! │  - Host launch context                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Session, resolution and explanation logic
//! - `farcaster`: URL normalization, embeds, indexing client, launch context
//! - `llm`: Image validation, prompts, generation client
//! - `data`: Domain types
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod farcaster;
pub mod llm;
pub mod metrics;
pub mod service;

use std::sync::Arc;

use farcaster::{CastLookup, FileLaunchContext, LaunchContextProvider, StaticLaunchContext};
use llm::ChatModel;
use service::{CastResolver, Explainer, SessionController};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// The explanation session
    pub session: Arc<SessionController>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Check both API keys
    /// 2. Build the shared HTTP client
    /// 3. Build the indexing and generation clients
    ///
    /// # Errors
    /// `ConfigMissing` when an API key is absent; `Internal` if the
    /// HTTP client cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Fail fast on missing secrets
        let neynar_key = config.neynar_api_key()?.to_string();
        let openai_key = config.openai_api_key()?.to_string();

        // 2. Initialize HTTP client
        let http_client = Arc::new(
            reqwest::Client::builder()
                .user_agent(concat!("eli5cast/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(config.http.timeout_seconds))
                .build()
                .map_err(|e| error::AppError::Internal(e.into()))?,
        );

        // 3. Upstream clients
        let lookup = farcaster::NeynarClient::new(
            http_client.clone(),
            &config.neynar.base_url,
            &neynar_key,
        );
        let model = llm::OpenAiClient::new(http_client, &config.openai.base_url, &openai_key);

        tracing::info!(
            neynar = %config.neynar.base_url,
            openai = %config.openai.base_url,
            "Upstream clients initialized"
        );

        Ok(Self::with_clients(config, Arc::new(lookup), Arc::new(model)))
    }

    /// Assemble state around already-built upstream clients
    pub fn with_clients(
        config: config::AppConfig,
        lookup: Arc<dyn CastLookup>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        let session = SessionController::new(CastResolver::new(lookup), Explainer::new(model));

        Self {
            config: Arc::new(config),
            session: Arc::new(session),
        }
    }

    /// Where the host's launch context comes from
    pub fn launch_provider(&self) -> Arc<dyn LaunchContextProvider> {
        match &self.config.launch.context_path {
            Some(path) => Arc::new(FileLaunchContext::new(path.clone())),
            None => Arc::new(StaticLaunchContext(None)),
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::session_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
