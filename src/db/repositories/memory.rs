use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use crate::db::error::RepositoryError;
use crate::db::models::User;
use crate::db::repositories::UserStore;

/// In-process `UserStore` for tests. Reads and writes can be made to fail
/// to exercise the error paths.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<ObjectId, User>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.lock().await.insert(user.id, user);
    }

    pub async fn get(&self, id: ObjectId) -> Option<User> {
        self.users.lock().await.get(&id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionError("reads disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_provider_id(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.check_reads()?;
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.auth.provider == provider && user.provider_id == provider_id)
            .cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, RepositoryError> {
        self.check_reads()?;
        Ok(self.get(id).await)
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseError("writes disabled".to_string()));
        }
        self.insert(user.clone()).await;
        Ok(())
    }
}
