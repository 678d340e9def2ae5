// src/handlers/auth.rs

use axum::extract::{Query, State};
use plant_tracker_api::{Flash, OAuthCallbackQuery};

use crate::app::AppState;
use crate::auth::extractors::Session;
use crate::auth::provider::PendingHandshake;
use crate::db::models::User;
use crate::error::AppError;
use crate::response::PageResponse;
use crate::views;

/// GET /auth/twitter
/// Sends the browser to Twitter's authorization page
pub async fn twitter_login(
    State(state): State<AppState>,
    Session(mut session): Session,
) -> Result<PageResponse, AppError> {
    match state.identity.begin().await {
        Ok(handshake) => {
            session.handshake = Some(handshake.pending);
            PageResponse::redirect(handshake.authorize_url.as_str())
                .with_session(&state.sessions, &session)
        }
        Err(e) => {
            tracing::error!("Could not start {} sign-in: {e}", state.identity.name());
            session.push_flash(Flash::error("Could not reach Twitter, please try again."));
            PageResponse::redirect("/login").with_session(&state.sessions, &session)
        }
    }
}

/// GET /auth/twitter/callback
/// Completes the handshake and signs the user in
pub async fn twitter_callback(
    State(state): State<AppState>,
    Session(mut session): Session,
    Query(callback): Query<OAuthCallbackQuery>,
) -> Result<PageResponse, AppError> {
    let Some(pending) = session.handshake.take() else {
        tracing::warn!("Callback received without a pending handshake");
        session.push_flash(Flash::error("Your sign-in expired, please try again."));
        return PageResponse::redirect("/login").with_session(&state.sessions, &session);
    };

    match sign_in(&state, &pending, &callback).await {
        Ok(user) => {
            session.login(user.id);
            session.push_flash(Flash::notice(format!("Signed in as @{}.", user.username)));
            PageResponse::redirect("/").with_session(&state.sessions, &session)
        }
        Err(e) => {
            tracing::warn!("Sign-in failed: {e}");
            session.push_flash(Flash::error("Sign-in with Twitter failed."));
            PageResponse::redirect("/login").with_session(&state.sessions, &session)
        }
    }
}

async fn sign_in(
    state: &AppState,
    pending: &PendingHandshake,
    callback: &OAuthCallbackQuery,
) -> Result<User, AppError> {
    let grant = state.identity.complete(pending, callback).await?;
    state.identity_service.authenticate(grant).await
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    Session(mut session): Session,
) -> Result<PageResponse, AppError> {
    session.logout();
    PageResponse::redirect("/").with_session(&state.sessions, &session)
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Session(mut session): Session,
) -> Result<PageResponse, AppError> {
    let messages = session.take_flashes();
    PageResponse::html(views::render_login(&messages)).with_session(&state.sessions, &session)
}
