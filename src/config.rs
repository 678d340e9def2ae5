use anyhow::Result;
use std::env;

const DEV_SESSION_SECRET: &str = "dev_session_secret_change_in_production";
const DEFAULT_DATABASE_URL: &str = "mongodb://localhost:27017/plant_tracker";
const DEFAULT_CALLBACK_URL: &str = "http://localhost:3000/auth/twitter/callback";
const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Detects the environment from the process variables
    fn detect_from(source: impl Fn(&str) -> Option<String>) -> Self {
        // Lambda only ever runs deployed builds
        if source("AWS_LAMBDA_FUNCTION_NAME").is_some() {
            return Self::Production;
        }

        match source("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Twitter application credentials.
#[derive(Debug, Clone, Default)]
pub struct TwitterConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub callback_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub twitter: TwitterConfig,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// Missing values are warned about and defaulted, except the session
    /// secret in production which must be set and at least 32 characters.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let source = |key: &str| source(key).filter(|value| !value.trim().is_empty());
        let environment = Environment::detect_from(&source);

        tracing::info!(
            "🌍 Environment detected: {}",
            environment.as_str().to_uppercase()
        );

        let database_url = Self::required_or(&source, "MONGOHQ", DEFAULT_DATABASE_URL);
        let twitter = TwitterConfig {
            consumer_key: Self::required_or(&source, "TWITTER_CONSUMER_KEY", ""),
            consumer_secret: Self::required_or(&source, "TWITTER_CONSUMER_SECRET", ""),
            callback_url: Self::required_or(&source, "TWITTER_CALLBACK_URL", DEFAULT_CALLBACK_URL),
        };
        let session_secret = Self::get_session_secret(&source, &environment)?;
        let session_ttl_hours = Self::get_session_ttl_hours(&source);
        let server_host = source("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = source("PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        tracing::info!("✅ Configuration loaded successfully");
        tracing::debug!("   Database: {}", Self::mask_credentials(&database_url));
        tracing::debug!("   Callback: {}", twitter.callback_url);
        tracing::debug!("   Server: {}:{}", server_host, server_port);

        Ok(Self {
            environment,
            database_url,
            twitter,
            session_secret,
            session_ttl_hours,
            server_host,
            server_port,
        })
    }

    /// Reads `key`, warning and falling back to `default` when it is unset
    fn required_or(source: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
        source(key).unwrap_or_else(|| {
            tracing::warn!("⚠️  {key} is not set");
            default.to_string()
        })
    }

    /// SESSION_TTL_HOURS, kept within one hour and one year
    fn get_session_ttl_hours(source: &impl Fn(&str) -> Option<String>) -> i64 {
        let Some(raw) = source("SESSION_TTL_HOURS") else {
            return DEFAULT_SESSION_TTL_HOURS;
        };
        match raw.trim().parse::<i64>() {
            Ok(hours) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => hours,
            _ => {
                tracing::warn!(
                    "⚠️  SESSION_TTL_HOURS={raw} is outside 1..={MAX_SESSION_TTL_HOURS}, using {DEFAULT_SESSION_TTL_HOURS}"
                );
                DEFAULT_SESSION_TTL_HOURS
            }
        }
    }

    fn get_session_secret(
        source: &impl Fn(&str) -> Option<String>,
        environment: &Environment,
    ) -> Result<String> {
        let secret = match source("SESSION_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                tracing::error!("❌ SESSION_SECRET not set in production!");
                anyhow::bail!("SESSION_SECRET is required in production");
            }
            None => {
                tracing::warn!("⚠️  SESSION_SECRET not set, using default (DEVELOPMENT ONLY!)");
                DEV_SESSION_SECRET.to_string()
            }
        };

        if environment.is_production() && secret.len() < 32 {
            anyhow::bail!(
                "SESSION_SECRET must be at least 32 characters in production (current: {})",
                secret.len()
            );
        }

        Ok(secret)
    }

    /// Hides credentials embedded in a connection string
    pub fn mask_credentials(url: &str) -> String {
        if let Some(at_pos) = url.rfind('@')
            && let Some(scheme_end) = url.find("://")
            && scheme_end < at_pos
        {
            let scheme = &url[..scheme_end + 3];
            let after_at = &url[at_pos..];
            return format!("{}***:***{}", scheme, after_at);
        }
        url.to_string()
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
