// src/app.rs

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::provider::IdentityProvider;
use crate::auth::services::IdentityService;
use crate::auth::session::SessionManager;
use crate::db::repositories::UserStore;
use crate::handlers::auth::{login_page, logout, twitter_callback, twitter_login};
use crate::handlers::health::health;
use crate::handlers::index::index;
use crate::handlers::plants::upsert_plant;
use crate::plants::PlantService;

/// Shared by every handler; built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub identity: Arc<dyn IdentityProvider>,
    pub identity_service: Arc<IdentityService>,
    pub plant_service: Arc<PlantService>,
}

impl AppState {
    pub fn new(
        sessions: SessionManager,
        users: Arc<dyn UserStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            sessions,
            identity,
            identity_service: Arc::new(IdentityService::new(users.clone())),
            plant_service: Arc::new(PlantService::new(users)),
        }
    }
}

/// Twitter sign-in and sign-out routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/twitter", get(twitter_login))
        .route("/auth/twitter/callback", get(twitter_callback))
        .route("/logout", get(logout))
        .route("/login", get(login_page))
}

/// Builds the complete application
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plants", post(upsert_plant))
        .route("/health", get(health))
        .merge(auth_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
