use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A plant embedded in its owner's document.
///
/// `id` is generated at creation. Plants saved before ids existed get one the
/// first time they are loaded, and keep it once the owner is saved again.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    #[serde(default = "ObjectId::new")]
    pub id: ObjectId,
    #[serde(rename = "type", default)]
    pub plant_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withered_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub died_at: Option<DateTime>,
    #[serde(default)]
    pub waterings: Vec<Watering>,
}

impl Plant {
    pub fn new(plant_type: String, description: String) -> Self {
        Self {
            id: ObjectId::new(),
            plant_type,
            description,
            created_at: DateTime::now(),
            withered_at: None,
            died_at: None,
            waterings: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Watering {
    #[serde(default)]
    pub source: String,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default)]
    pub description: String,
    /// Opaque payload supplied by the watering source.
    #[serde(default)]
    pub data: String,
}
