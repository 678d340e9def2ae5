//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! Only the client side is implemented: building the signature base string,
//! signing it and rendering the `Authorization` header.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as-is, everything else is encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Consumer key/secret identifying this application to the provider.
#[derive(Debug, Clone)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

/// A request to be signed.
#[derive(Debug, Clone, Default)]
pub struct OAuthRequest<'a> {
    pub method: &'a str,
    /// Base URL, without query string.
    pub url: &'a str,
    /// Extra `oauth_*` parameters such as `oauth_callback` or `oauth_verifier`.
    pub protocol_params: Vec<(&'a str, &'a str)>,
    /// Query or form parameters sent with the request; they are signed but
    /// not placed in the header.
    pub request_params: Vec<(&'a str, &'a str)>,
    /// Token and token secret, once the handshake has produced one.
    pub token: Option<(&'a str, &'a str)>,
}

impl ConsumerCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }

    /// Renders the `Authorization: OAuth ...` header value.
    pub fn authorization_header(
        &self,
        request: &OAuthRequest<'_>,
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", "1.0"),
        ];
        if let Some((token, _)) = request.token {
            oauth_params.push(("oauth_token", token));
        }
        oauth_params.extend(request.protocol_params.iter().copied());

        let mut signed_params = oauth_params.clone();
        signed_params.extend(request.request_params.iter().copied());
        let base = signature_base_string(request.method, request.url, &signed_params);
        let token_secret = request.token.map_or("", |(_, secret)| secret);
        let signature = sign(&base, &self.secret, token_secret);

        oauth_params.push(("oauth_signature", signature.as_str()));
        let mut encoded: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        encoded.sort();

        let fields: Vec<String> = encoded
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }
}

/// `METHOD&url&normalized-params`, every part percent-encoded.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

/// Base64 HMAC-SHA1 of the base string, keyed by `consumer_secret&token_secret`.
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Decodes an `application/x-www-form-urlencoded` token response.
pub fn parse_form_response(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}
