use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header;
use plant_tracker_api::OAuthCallbackQuery;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::oauth1::{ConsumerCredentials, OAuthRequest, parse_form_response};
use crate::config::TwitterConfig;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Identity provider is not configured: {0}")]
    NotConfigured(String),
    #[error("Request to identity provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Malformed identity provider response: {0}")]
    MalformedResponse(String),
    #[error("Authorization was denied")]
    Denied,
    #[error("Callback does not match a pending handshake")]
    HandshakeMismatch,
}

/// Temporary request token kept in the session between the redirect to the
/// provider and its callback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingHandshake {
    pub token: String,
    pub token_secret: String,
}

#[derive(Debug, Clone)]
pub struct Handshake {
    pub pending: PendingHandshake,
    pub authorize_url: Url,
}

/// Subset of the provider's user profile the application keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
}

/// Outcome of a completed handshake.
#[derive(Debug, Clone)]
pub struct ProviderGrant {
    pub provider: String,
    pub token: String,
    pub token_secret: String,
    pub profile: Profile,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Obtains a request token and the URL to send the browser to.
    async fn begin(&self) -> Result<Handshake, OAuthError>;

    /// Exchanges the callback for access credentials and the user's profile.
    async fn complete(
        &self,
        pending: &PendingHandshake,
        callback: &OAuthCallbackQuery,
    ) -> Result<ProviderGrant, OAuthError>;
}

/// Checks the callback against the pending handshake and returns the verifier.
pub fn verify_callback<'a>(
    pending: &PendingHandshake,
    callback: &'a OAuthCallbackQuery,
) -> Result<&'a str, OAuthError> {
    if callback.denied.is_some() {
        return Err(OAuthError::Denied);
    }
    if callback.oauth_token.as_deref() != Some(pending.token.as_str()) {
        return Err(OAuthError::HandshakeMismatch);
    }
    callback
        .oauth_verifier
        .as_deref()
        .filter(|verifier| !verifier.is_empty())
        .ok_or_else(|| OAuthError::MalformedResponse("callback without oauth_verifier".into()))
}

const TWITTER_API: &str = "https://api.twitter.com";

/// Twitter's three-legged OAuth 1.0a flow.
pub struct TwitterProvider {
    credentials: ConsumerCredentials,
    callback_url: String,
    api_base: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TwitterUser {
    id_str: String,
    screen_name: String,
    #[serde(default)]
    name: String,
    profile_image_url_https: Option<String>,
    profile_image_url: Option<String>,
}

impl From<TwitterUser> for Profile {
    fn from(user: TwitterUser) -> Self {
        Profile {
            id: user.id_str,
            username: user.screen_name,
            display_name: user.name,
            avatar_url: user
                .profile_image_url_https
                .or(user.profile_image_url)
                .unwrap_or_default(),
        }
    }
}

impl TwitterProvider {
    pub fn new(config: &TwitterConfig) -> Result<Self, OAuthError> {
        Self::with_api_base(config, TWITTER_API)
    }

    /// Same provider talking to another host, such as a local mock server.
    fn with_api_base(config: &TwitterConfig, api_base: &str) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            credentials: ConsumerCredentials::new(&config.consumer_key, &config.consumer_secret),
            callback_url: config.callback_url.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn nonce() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    fn ensure_configured(&self) -> Result<(), OAuthError> {
        if self.credentials.is_configured() {
            Ok(())
        } else {
            Err(OAuthError::NotConfigured(
                "TWITTER_CONSUMER_KEY and TWITTER_CONSUMER_SECRET are required".to_string(),
            ))
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, OAuthError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn signed_post(&self, request: &OAuthRequest<'_>) -> Result<String, OAuthError> {
        let authorization =
            self.credentials
                .authorization_header(request, &Self::nonce(), Utc::now().timestamp());
        self.send(
            self.http
                .post(request.url)
                .header(header::AUTHORIZATION, authorization),
        )
        .await
    }

    async fn fetch_profile(&self, token: &str, token_secret: &str) -> Result<Profile, OAuthError> {
        let url = format!("{}/1.1/account/verify_credentials.json", self.api_base);
        let request = OAuthRequest {
            method: "GET",
            url: &url,
            request_params: vec![("skip_status", "true")],
            token: Some((token, token_secret)),
            ..Default::default()
        };
        let authorization =
            self.credentials
                .authorization_header(&request, &Self::nonce(), Utc::now().timestamp());

        let body = self
            .send(
                self.http
                    .get(&url)
                    .query(&request.request_params)
                    .header(header::AUTHORIZATION, authorization),
            )
            .await?;

        serde_json::from_str::<TwitterUser>(&body)
            .map(Profile::from)
            .map_err(|e| OAuthError::MalformedResponse(format!("profile: {e}")))
    }
}

fn required_field(
    fields: &std::collections::HashMap<String, String>,
    name: &str,
) -> Result<String, OAuthError> {
    fields
        .get(name)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| OAuthError::MalformedResponse(format!("missing {name}")))
}

#[async_trait]
impl IdentityProvider for TwitterProvider {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn begin(&self) -> Result<Handshake, OAuthError> {
        self.ensure_configured()?;

        let url = format!("{}/oauth/request_token", self.api_base);
        let body = self
            .signed_post(&OAuthRequest {
                method: "POST",
                url: &url,
                protocol_params: vec![("oauth_callback", self.callback_url.as_str())],
                ..Default::default()
            })
            .await?;

        let fields = parse_form_response(&body);
        if fields.get("oauth_callback_confirmed").map(String::as_str) != Some("true") {
            return Err(OAuthError::MalformedResponse(
                "callback not confirmed".to_string(),
            ));
        }
        let pending = PendingHandshake {
            token: required_field(&fields, "oauth_token")?,
            token_secret: required_field(&fields, "oauth_token_secret")?,
        };

        let authorize_url = Url::parse_with_params(
            &format!("{}/oauth/authenticate", self.api_base),
            [("oauth_token", pending.token.as_str())],
        )
        .map_err(|e| OAuthError::MalformedResponse(e.to_string()))?;

        tracing::debug!("Obtained Twitter request token");
        Ok(Handshake {
            pending,
            authorize_url,
        })
    }

    async fn complete(
        &self,
        pending: &PendingHandshake,
        callback: &OAuthCallbackQuery,
    ) -> Result<ProviderGrant, OAuthError> {
        self.ensure_configured()?;
        let verifier = verify_callback(pending, callback)?;

        let url = format!("{}/oauth/access_token", self.api_base);
        let body = self
            .signed_post(&OAuthRequest {
                method: "POST",
                url: &url,
                protocol_params: vec![("oauth_verifier", verifier)],
                token: Some((pending.token.as_str(), pending.token_secret.as_str())),
                ..Default::default()
            })
            .await?;

        let fields = parse_form_response(&body);
        let token = required_field(&fields, "oauth_token")?;
        let token_secret = required_field(&fields, "oauth_token_secret")?;
        let profile = self.fetch_profile(&token, &token_secret).await?;

        Ok(ProviderGrant {
            provider: self.name().to_string(),
            token,
            token_secret,
            profile,
        })
    }
}
