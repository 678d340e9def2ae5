// src/auth/services.rs

use std::sync::Arc;

use crate::auth::provider::ProviderGrant;
use crate::auth::session::SessionData;
use crate::db::models::{Auth, User};
use crate::db::repositories::UserStore;
use crate::error::AppError;

pub struct IdentityService {
    users: Arc<dyn UserStore>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Maps a provider grant to a local user (find-or-create).
    ///
    /// Tokens are refreshed on every login, for new and returning users
    /// alike. Profile fields are only copied when the user is first created.
    pub async fn authenticate(&self, grant: ProviderGrant) -> Result<User, AppError> {
        let ProviderGrant {
            provider,
            token,
            token_secret,
            profile,
        } = grant;

        let existing = self
            .users
            .find_by_provider_id(&provider, &profile.id)
            .await
            .inspect_err(|e| {
                tracing::error!(provider_id = %profile.id, "Database error while looking up user: {e}");
            })?;

        let mut user = match existing {
            Some(user) => user,
            None => {
                tracing::info!(username = %profile.username, "Creating user on first login");
                User::new(
                    profile.id,
                    profile.username,
                    profile.display_name,
                    profile.avatar_url,
                )
            }
        };

        user.refresh_auth(Auth {
            provider,
            token,
            token_secret,
        });

        match self.users.save(&user).await {
            Ok(()) => {
                tracing::info!("User {} logged in and saved/updated", user.username);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Could not save user {}: {e}", user.username);
                Err(e.into())
            }
        }
    }

    /// Loads the session's principal. A session pointing at a user that no
    /// longer exists is logged out.
    pub async fn current_user(&self, session: &mut SessionData) -> Result<Option<User>, AppError> {
        let Some(id) = session.principal_id() else {
            if session.sub.is_some() {
                session.logout();
            }
            return Ok(None);
        };

        let user = self.users.find_by_id(id).await?;
        if user.is_none() {
            tracing::warn!(%id, "Session refers to a missing user");
            session.logout();
        }
        Ok(user)
    }
}
