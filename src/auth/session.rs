use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mongodb::bson::oid::ObjectId;
use plant_tracker_api::Flash;
use serde::{Deserialize, Serialize};

use crate::auth::provider::PendingHandshake;

pub const SESSION_COOKIE: &str = "plant_tracker.sid";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session encoding failed: {0}")]
    EncodingFailed(jsonwebtoken::errors::Error),
    #[error("Session verification failed: {0}")]
    VerificationFailed(jsonwebtoken::errors::Error),
    #[error("Session cookie is not a valid header value")]
    InvalidCookie,
    #[error("Session lifetime of {0} hours is out of range")]
    InvalidLifetime(i64),
}

/// Everything the browser carries between requests.
///
/// Only the principal's id is stored; the user itself is loaded from the
/// database on every request.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flash: Vec<Flash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handshake: Option<PendingHandshake>,
}

impl SessionData {
    pub fn principal_id(&self) -> Option<ObjectId> {
        self.sub
            .as_deref()
            .and_then(|sub| ObjectId::parse_str(sub).ok())
    }

    pub fn login(&mut self, user_id: ObjectId) {
        self.sub = Some(user_id.to_hex());
        self.handshake = None;
    }

    pub fn logout(&mut self) {
        self.sub = None;
        self.handshake = None;
    }

    pub fn push_flash(&mut self, flash: Flash) {
        self.flash.push(flash);
    }

    /// Returns the pending messages and clears them.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flash)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    data: SessionData,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: &str, ttl_hours: i64, secure: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            ttl_hours,
            secure,
        }
    }

    pub fn encode(&self, data: &SessionData) -> Result<String, SessionError> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(SessionError::InvalidLifetime(self.ttl_hours))?;
        let claims = Claims {
            data: data.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(SessionError::EncodingFailed)
    }

    pub fn decode(&self, token: &str) -> Result<SessionData, SessionError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims.data)
            .map_err(SessionError::VerificationFailed)
    }

    /// Restores the session from the `Cookie` header. A missing, expired or
    /// tampered cookie yields an anonymous session.
    pub fn from_headers(&self, headers: &HeaderMap) -> SessionData {
        let Some(token) = read_cookie(headers, SESSION_COOKIE) else {
            return SessionData::default();
        };

        self.decode(&token).unwrap_or_else(|e| {
            tracing::debug!("Discarding session cookie: {e}");
            SessionData::default()
        })
    }

    /// `Set-Cookie` value persisting `data`.
    pub fn cookie(&self, data: &SessionData) -> Result<HeaderValue, SessionError> {
        let token = self.encode(data)?;
        let max_age = self
            .ttl_hours
            .checked_mul(3600)
            .ok_or(SessionError::InvalidLifetime(self.ttl_hours))?;
        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(|_| SessionError::InvalidCookie)
    }
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .find_map(|kv| {
            let mut it = kv.trim().splitn(2, '=');
            match (it.next(), it.next()) {
                (Some(key), Some(value)) if key == name => Some(value.trim().to_string()),
                _ => None,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new("my_secret_key_for_tests", 1, false)
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn encode_and_decode_round_trip() {
        let sessions = manager();
        let mut data = SessionData::default();
        data.login(ObjectId::new());
        data.push_flash(Flash::notice("Plant saved"));

        let token = sessions.encode(&data).expect("encode");
        let decoded = sessions.decode(&token).expect("decode");

        assert_eq!(decoded, data);
        assert!(token.contains('.'), "session token is a JWT");
    }

    #[test]
    fn decode_rejects_foreign_secret() {
        let token = SessionManager::new("other_secret", 1, false)
            .encode(&SessionData::default())
            .unwrap();
        assert!(matches!(
            manager().decode(&token),
            Err(SessionError::VerificationFailed(_))
        ));
    }

    #[test]
    fn tampered_cookie_yields_anonymous_session() {
        let sessions = manager();
        let mut data = SessionData::default();
        data.login(ObjectId::new());
        let mut token = sessions.encode(&data).unwrap();
        token.push('x');

        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={token}"));
        assert_eq!(sessions.from_headers(&headers), SessionData::default());
    }

    #[test]
    fn from_headers_finds_cookie_among_others() {
        let sessions = manager();
        let mut data = SessionData::default();
        let id = ObjectId::new();
        data.login(id);
        let token = sessions.encode(&data).unwrap();

        let headers = headers_with_cookie(&format!("theme=dark; {SESSION_COOKIE}={token}; lang=fr"));
        assert_eq!(sessions.from_headers(&headers).principal_id(), Some(id));
    }

    #[test]
    fn cookie_sets_secure_flag_only_when_requested() {
        let data = SessionData::default();
        let plain = manager().cookie(&data).unwrap();
        let secure = SessionManager::new("k", 1, true).cookie(&data).unwrap();

        assert!(plain.to_str().unwrap().contains("HttpOnly"));
        assert!(!plain.to_str().unwrap().contains("Secure"));
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        let sessions = SessionManager::new("k", 100_000_000_000, false);
        assert!(matches!(
            sessions.cookie(&SessionData::default()),
            Err(SessionError::InvalidLifetime(100_000_000_000))
        ));
    }

    #[test]
    fn login_clears_pending_handshake() {
        let mut data = SessionData {
            handshake: Some(PendingHandshake {
                token: "t".to_string(),
                token_secret: "s".to_string(),
            }),
            ..Default::default()
        };
        data.login(ObjectId::new());
        assert!(data.handshake.is_none());
        assert!(data.principal_id().is_some());
    }

    #[test]
    fn take_flashes_empties_the_queue() {
        let mut data = SessionData::default();
        data.push_flash(Flash::error("nope"));
        assert_eq!(data.take_flashes().len(), 1);
        assert!(data.flash.is_empty());
    }

    #[test]
    fn invalid_subject_has_no_principal() {
        let data = SessionData {
            sub: Some("not-an-object-id".to_string()),
            ..Default::default()
        };
        assert!(data.principal_id().is_none());
    }
}
