// src/handlers/plants.rs

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use plant_tracker_api::{Flash, PlantRequest};

use crate::app::AppState;
use crate::auth::extractors::Session;
use crate::db::models::PlantChange;
use crate::error::AppError;
use crate::response::PageResponse;

const SIGN_IN_FIRST: &str = "Sign in to save plants.";

/// POST /plants
/// Updates the referenced plant, or adds a new one
pub async fn upsert_plant(
    State(state): State<AppState>,
    Session(mut session): Session,
    form: Result<Form<PlantRequest>, FormRejection>,
) -> Result<PageResponse, AppError> {
    let Some(user_id) = session.principal_id() else {
        session.push_flash(Flash::error(SIGN_IN_FIRST));
        return PageResponse::redirect("/").with_session(&state.sessions, &session);
    };

    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            tracing::warn!(%user_id, "Unreadable plant submission: {rejection}");
            session.push_flash(Flash::error("Your plant could not be read."));
            return PageResponse::redirect("/").with_session(&state.sessions, &session);
        }
    };

    match state.plant_service.upsert(user_id, &request).await {
        Ok((_, PlantChange::Created(_))) => session.push_flash(Flash::notice("Plant added.")),
        Ok((_, PlantChange::Updated(_))) => session.push_flash(Flash::notice("Plant updated.")),
        Err(AppError::NotFound(_)) => {
            tracing::warn!(%user_id, "Plant submitted for a missing user");
            session.logout();
            session.push_flash(Flash::error(SIGN_IN_FIRST));
        }
        Err(_) => session.push_flash(Flash::error("Your plant could not be saved.")),
    }

    PageResponse::redirect("/").with_session(&state.sessions, &session)
}
