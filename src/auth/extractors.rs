use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app::AppState;
use crate::auth::session::SessionData;

/// Session restored from the signed cookie.
///
/// Never rejects: requests without a valid cookie get an anonymous session,
/// and each handler decides what an anonymous caller may do.
#[derive(Debug, Clone, Default)]
pub struct Session(pub SessionData);

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session(state.sessions.from_headers(&parts.headers)))
    }
}
