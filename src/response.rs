use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::auth::session::{SessionData, SessionManager};
use crate::error::AppError;

enum Body {
    Redirect(String),
    Html(String),
}

/// Browser-facing response: a redirect or an HTML page, optionally carrying
/// the refreshed session cookie.
///
/// # Examples
///
/// ```rust,ignore
/// // Flash a message and go home
/// session.push_flash(Flash::notice("Plant saved"));
/// PageResponse::redirect("/").with_session(&state.sessions, &session)
/// ```
pub struct PageResponse {
    body: Body,
    headers: HeaderMap,
}

impl PageResponse {
    /// 302 Found to `location`
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            body: Body::Redirect(location.into()),
            headers: HeaderMap::new(),
        }
    }

    /// 200 OK with an HTML document
    pub fn html(document: String) -> Self {
        Self {
            body: Body::Html(document),
            headers: HeaderMap::new(),
        }
    }

    /// Persists `session` through a `Set-Cookie` header.
    pub fn with_session(
        mut self,
        sessions: &SessionManager,
        session: &SessionData,
    ) -> Result<Self, AppError> {
        self.headers
            .insert(header::SET_COOKIE, sessions.cookie(session)?);
        Ok(self)
    }
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Body::Redirect(location) => match HeaderValue::from_str(&location) {
                Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
                Err(_) => {
                    AppError::internal(format!("Invalid redirect target: {location}")).into_response()
                }
            },
            Body::Html(document) => Html(document).into_response(),
        };

        response.headers_mut().extend(self.headers);
        response
    }
}
