use axum::extract::State;
use plant_tracker_api::Flash;

use crate::app::AppState;
use crate::auth::extractors::Session;
use crate::error::AppError;
use crate::response::PageResponse;
use crate::views;

/// GET /
/// Renders the current user's plants, or the anonymous landing page
pub async fn index(
    State(state): State<AppState>,
    Session(mut session): Session,
) -> Result<PageResponse, AppError> {
    let user = match state.identity_service.current_user(&mut session).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Could not load current user: {e}");
            session.push_flash(Flash::error("Your plants could not be loaded."));
            None
        }
    };

    let messages = session.take_flashes();
    PageResponse::html(views::render_index(user.as_ref(), &messages))
        .with_session(&state.sessions, &session)
}
