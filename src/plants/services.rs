// src/plants/services.rs

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use plant_tracker_api::PlantRequest;

use crate::db::models::{PlantChange, User};
use crate::db::repositories::UserStore;
use crate::error::AppError;

pub struct PlantService {
    users: Arc<dyn UserStore>,
}

impl PlantService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Load-mutate-save of one plant on the user's document.
    ///
    /// Not atomic: two concurrent submissions for the same user race and the
    /// last save wins.
    pub async fn upsert(
        &self,
        user_id: ObjectId,
        request: &PlantRequest,
    ) -> Result<(User, PlantChange), AppError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;

        let change = user.upsert_plant(request);

        self.users.save(&user).await.inspect_err(|e| {
            tracing::error!(%user_id, ?change, "Could not save plant: {e}");
        })?;

        match change {
            PlantChange::Updated(index) => {
                tracing::info!(username = %user.username, index, "Plant updated");
            }
            PlantChange::Created(index) => {
                tracing::info!(username = %user.username, index, "Plant added");
            }
        }
        Ok((user, change))
    }
}
