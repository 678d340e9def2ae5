use serde::{Deserialize, Serialize};

// -------- REQUEST DTOs --------

/// Body of `POST /plants`.
///
/// `id` is either a plant's stable identifier or, for older clients, the
/// plant's position in the user's list.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub plant_type: String,
    #[serde(default)]
    pub description: String,
}

impl PlantRequest {
    /// The plant reference, ignoring blank values submitted by HTML forms.
    pub fn reference(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Query string the identity provider appends to the callback URL.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OAuthCallbackQuery {
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    pub denied: Option<String>,
}
