//! HTTP server wiring

pub mod auth;
pub mod handlers;
pub mod types;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::account::{AccountManager, IdentityStore};
use crate::config::AppConfig;
use crate::credential::CredentialService;
use crate::error::ApiError;
use crate::follow::FollowGraph;
use crate::mailer::Mailer;
use crate::stats::{ContentStatsProvider, NoContent, StatsAggregator};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountManager,
    pub stats: StatsAggregator,
    store: Arc<Mutex<IdentityStore>>,
    graph: Arc<Mutex<FollowGraph>>,
}

impl AppState {
    pub fn new(config: &AppConfig, mailer: Mailer) -> Self {
        Self::with_content_stats(config, mailer, Arc::new(NoContent))
    }

    pub fn with_content_stats(
        config: &AppConfig,
        mailer: Mailer,
        content: Arc<dyn ContentStatsProvider>,
    ) -> Self {
        let store = Arc::new(Mutex::new(IdentityStore::new()));
        let graph = Arc::new(Mutex::new(FollowGraph::new()));
        let credentials = CredentialService::new(&config.auth.token_secret);
        let accounts = AccountManager::new(
            store.clone(),
            credentials,
            mailer,
            config.auth.clone(),
        );
        let stats = StatsAggregator::new(store.clone(), graph.clone(), content);
        Self {
            accounts,
            stats,
            store,
            graph,
        }
    }

    pub(crate) fn lock_store(&self) -> Result<MutexGuard<'_, IdentityStore>, ApiError> {
        self.store
            .lock()
            .map_err(|e| ApiError::internal("identity store mutex poisoned", e))
    }

    pub(crate) fn lock_graph(&self) -> Result<MutexGuard<'_, FollowGraph>, ApiError> {
        self.graph
            .lock()
            .map_err(|e| ApiError::internal("follow graph mutex poisoned", e))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/signin", post(handlers::signin))
        .route("/auth/social", post(handlers::social))
        .route("/auth/forgotPassword", get(handlers::forgot_password))
        .route("/auth/resetPassword", post(handlers::reset_password))
        .route("/auth/verify/:token", get(handlers::verify))
        .route("/user/follow", post(handlers::follow))
        .route("/user/unfollow", post(handlers::unfollow))
        .route("/user/followed", get(handlers::followed))
        .route("/user/followers", get(handlers::followers))
        .route("/user/stats", get(handlers::stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct ApiServer {
    state: AppState,
    bind_addr: String,
}

impl ApiServer {
    pub fn new(state: AppState, port: u16) -> Self {
        Self {
            state,
            bind_addr: format!("0.0.0.0:{}", port),
        }
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let app = router(self.state);
        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        info!("API server listening on {}", self.bind_addr);
        axum::serve(listener, app).await
    }
}
