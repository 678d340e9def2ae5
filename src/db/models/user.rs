use mongodb::bson::{DateTime, oid::ObjectId};
use plant_tracker_api::PlantRequest;
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::models::plant::Plant;

pub const DEFAULT_PROVIDER: &str = "twitter";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// Credentials issued by the identity provider on the last login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub token_secret: String,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            token: String::new(),
            token_secret: String::new(),
        }
    }
}

/// One document of the `users` collection. Plants and their waterings are
/// embedded, so saving a user rewrites the whole tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(deserialize_with = "provider_id_from_text_or_number")]
    pub provider_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub plants: Vec<Plant>,
}

/// What `User::upsert_plant` did with the submitted descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantChange {
    Updated(usize),
    Created(usize),
}

impl User {
    pub fn new(
        provider_id: impl Into<String>,
        username: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            provider_id: provider_id.into(),
            username: username.into(),
            display_name: display_name.into(),
            avatar_url: avatar_url.into(),
            created_at: now,
            updated_at: now,
            auth: Auth::default(),
            plants: Vec::new(),
        }
    }

    /// Overwrites the stored credentials and bumps `updated_at`.
    pub fn refresh_auth(&mut self, auth: Auth) {
        self.auth = auth;
        self.updated_at = DateTime::now();
    }

    /// Position of the plant a client reference points at.
    ///
    /// Accepts the plant's stable id, or a decimal position (ASCII digits
    /// only, no sign) for clients that still address plants by index.
    pub fn resolve_plant(&self, reference: &str) -> Option<usize> {
        if let Ok(oid) = ObjectId::parse_str(reference) {
            return self.plants.iter().position(|plant| plant.id == oid);
        }
        if reference.is_empty() || !reference.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        reference
            .parse::<usize>()
            .ok()
            .filter(|index| *index < self.plants.len())
    }

    /// Updates the referenced plant in place, or appends a new one when the
    /// request carries no reference or the reference resolves to nothing.
    pub fn upsert_plant(&mut self, request: &PlantRequest) -> PlantChange {
        if let Some(index) = request.reference().and_then(|r| self.resolve_plant(r)) {
            let plant = &mut self.plants[index];
            plant.plant_type.clone_from(&request.plant_type);
            plant.description.clone_from(&request.description);
            return PlantChange::Updated(index);
        }

        self.plants.push(Plant::new(
            request.plant_type.clone(),
            request.description.clone(),
        ));
        PlantChange::Created(self.plants.len() - 1)
    }
}

/// Older documents stored the provider id as a number.
fn provider_id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ProviderId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match ProviderId::deserialize(deserializer)? {
        ProviderId::Text(text) => text,
        ProviderId::Int(number) => number.to_string(),
        ProviderId::Float(number) => format!("{number:.0}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    fn request(id: Option<&str>, plant_type: &str, description: &str) -> PlantRequest {
        PlantRequest {
            id: id.map(str::to_string),
            plant_type: plant_type.to_string(),
            description: description.to_string(),
        }
    }

    fn alice() -> User {
        let mut user = User::new("42", "alice", "Alice", "https://img/alice.png");
        user.upsert_plant(&request(None, "fern", ""));
        user
    }

    #[test]
    fn new_user_starts_without_plants() {
        let user = User::new("42", "alice", "Alice", "");
        assert!(user.plants.is_empty());
        assert_eq!(user.auth.provider, "twitter");
    }

    #[test]
    fn upsert_without_reference_appends() {
        let mut user = alice();
        let change = user.upsert_plant(&request(None, "cactus", "prickly"));

        assert_eq!(change, PlantChange::Created(1));
        assert_eq!(user.plants.len(), 2);
        assert_eq!(user.plants[0].plant_type, "fern");
        assert_eq!(user.plants[1].plant_type, "cactus");
        assert_eq!(user.plants[1].description, "prickly");
    }

    #[test]
    fn signed_or_non_digit_index_does_not_resolve() {
        let user = alice();
        assert_eq!(user.resolve_plant("0"), Some(0));
        for reference in ["+0", "-0", "0x0", "0.0", " 0"] {
            assert_eq!(user.resolve_plant(reference), None, "{reference}");
        }
    }

    #[test]
    fn upsert_with_index_overwrites_in_place() {
        let mut user = alice();
        user.upsert_plant(&request(None, "cactus", "prickly"));
        let before = user.plants[0].clone();

        let change = user.upsert_plant(&request(Some("0"), "palm", ""));

        assert_eq!(change, PlantChange::Updated(0));
        assert_eq!(user.plants.len(), 2);
        assert_eq!(user.plants[0].plant_type, "palm");
        assert_eq!(user.plants[0].id, before.id);
        assert_eq!(user.plants[0].created_at, before.created_at);
        assert_eq!(user.plants[1].plant_type, "cactus");
        assert_eq!(user.plants[1].description, "prickly");
    }

    #[test]
    fn upsert_with_stable_id_overwrites_in_place() {
        let mut user = alice();
        user.upsert_plant(&request(None, "cactus", "prickly"));
        let target = user.plants[1].id.to_hex();

        let change = user.upsert_plant(&request(Some(&target), "aloe", "gel"));

        assert_eq!(change, PlantChange::Updated(1));
        assert_eq!(user.plants[1].plant_type, "aloe");
        assert_eq!(user.plants[0].plant_type, "fern");
    }

    #[test]
    fn upsert_with_out_of_range_index_appends() {
        let mut user = alice();
        let change = user.upsert_plant(&request(Some("7"), "ivy", ""));
        assert_eq!(change, PlantChange::Created(1));
        assert_eq!(user.plants.len(), 2);
    }

    #[test]
    fn upsert_with_unknown_stable_id_appends() {
        let mut user = alice();
        let unknown = ObjectId::new().to_hex();
        let change = user.upsert_plant(&request(Some(&unknown), "ivy", ""));
        assert_eq!(change, PlantChange::Created(1));
    }

    #[test]
    fn upsert_stores_values_verbatim() {
        let mut user = User::new("42", "alice", "Alice", "");
        user.upsert_plant(&request(None, "<script>", ""));
        assert_eq!(user.plants[0].plant_type, "<script>");
        assert_eq!(user.plants[0].description, "");
    }

    #[test]
    fn refresh_auth_replaces_credentials() {
        let mut user = alice();
        user.refresh_auth(Auth {
            provider: "twitter".to_string(),
            token: "t2".to_string(),
            token_secret: "s2".to_string(),
        });
        assert_eq!(user.auth.token, "t2");
        assert_eq!(user.auth.token_secret, "s2");
        assert!(user.updated_at >= user.created_at);
        assert_eq!(user.plants.len(), 1);
    }

    #[test]
    fn legacy_document_loads_with_defaults() {
        let document = doc! {
            "_id": ObjectId::new(),
            "providerId": 12345_i64,
            "username": "bob",
            "auth": { "token": "t" },
            "plants": [ { "type": "fern" } ],
        };

        let user: User = bson::from_document(document).expect("legacy shape");

        assert_eq!(user.provider_id, "12345");
        assert_eq!(user.auth.provider, "twitter");
        assert_eq!(user.display_name, "");
        assert_eq!(user.plants.len(), 1);
        assert!(user.plants[0].waterings.is_empty());
    }

    #[test]
    fn document_round_trips_through_bson() {
        let user = alice();
        let document = bson::to_document(&user).expect("serializes");

        assert!(document.contains_key("_id"));
        assert!(document.contains_key("providerId"));
        assert!(document.get_document("auth").unwrap().contains_key("tokenSecret"));

        let back: User = bson::from_document(document).expect("deserializes");
        assert_eq!(back, user);
    }
}
