//! Settings API server

mod error;
pub mod security;

pub use error::ApiError;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{SessionProvider, TokenSessions};
use crate::config::SecurityConfig;
use crate::settings::{Language, LocalizedSettings, SettingsPatch, SettingsStore, SiteSettings};
use crate::Quicksilver;

/// Server state shared by all handlers
pub struct ServerState {
    pub store: SettingsStore,
    pub sessions: Box<dyn SessionProvider>,
    pub security: SecurityConfig,
}

impl ServerState {
    pub fn new(
        store: SettingsStore,
        sessions: Box<dyn SessionProvider>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            security,
        }
    }

    /// Build the state for a deployment from its configuration
    pub fn from_app(app: &Quicksilver) -> Self {
        Self::new(
            app.settings_store(),
            Box::new(TokenSessions::new(&app.config.auth)),
            app.config.security.clone(),
        )
    }
}

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/settings/:lang", get(get_localized_settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start(app: &Quicksilver, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::from_app(app));
    tracing::info!("Serving site settings from {:?}", state.store.path());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Run a store operation off the async worker threads
async fn with_store<T, F>(state: &Arc<ServerState>, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&SettingsStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state.store))
        .await
        .map_err(|e| {
            tracing::error!("Settings task failed: {}", e);
            ApiError::Internal
        })
}

/// GET /api/settings
async fn get_settings(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SiteSettings>, ApiError> {
    let settings = with_store(&state, |store| store.read()).await?;
    Ok(Json(settings))
}

/// GET /api/settings/:lang
async fn get_localized_settings(
    State(state): State<Arc<ServerState>>,
    Path(lang): Path<String>,
) -> Result<Json<LocalizedSettings>, ApiError> {
    let lang: Language = lang
        .parse()
        .map_err(|_| ApiError::NotFound("Unknown language"))?;
    let settings = with_store(&state, |store| store.read()).await?;
    Ok(Json(settings.localized(lang)))
}

/// PUT /api/settings
async fn update_settings(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SiteSettings>, ApiError> {
    security::validate_api_request(&headers, &state.security)?;

    let session = state
        .sessions
        .session(&headers)
        .filter(|s| s.is_valid())
        .ok_or(ApiError::Unauthorized)?;

    let patch: SettingsPatch =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!("User {} updating site settings", session.user.id);
    let settings = with_store(&state, move |store| store.write(patch)).await??;
    Ok(Json(settings))
}
