use async_trait::async_trait;
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc, oid::ObjectId},
};

use crate::db::error::RepositoryError;
use crate::db::models::User;

/// Storage operations the services rely on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Natural-key lookup used by find-or-create on login.
    async fn find_by_provider_id(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, RepositoryError>;

    /// Insert or replace the whole document.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;
}

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub const COLLECTION: &'static str = "users";

    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(Self::COLLECTION),
        }
    }

    /// Matches the provider id whether it was stored as text or, in older
    /// documents, as a number (MongoDB compares numeric types by value).
    fn provider_filter(provider: &str, provider_id: &str) -> Document {
        let mut candidates = vec![Bson::String(provider_id.to_string())];
        if let Ok(number) = provider_id.parse::<i64>() {
            candidates.push(Bson::Int64(number));
        }

        doc! {
            "auth.provider": provider,
            "providerId": { "$in": candidates },
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_provider_id(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.collection
            .find_one(Self::provider_filter(provider, provider_id))
            .await
            .map_err(Into::into)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, RepositoryError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.collection
            .replace_one(doc! { "_id": user.id }, user)
            .upsert(true)
            .await?;
        Ok(())
    }
}
