//! User profile stored at `users/{userId}`.

use super::EpochMs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile fields kept next to the user's child collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub created_at: EpochMs,
    /// Set once the onboarding screen has been completed.
    #[serde(default)]
    pub onboarded: bool,
}

impl UserProfile {
    /// Store `update` fields for the whole profile.
    ///
    /// Written with `update`, never `set`, so `goals`/`tasks`/`journal`
    /// under the same node survive.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UserProfile;

    #[test]
    fn photo_url_uses_provider_field_name() {
        let profile = UserProfile {
            username: "ana".into(),
            email: "ana@example.com".into(),
            photo_url: Some("file:///p.png".into()),
            created_at: 1,
            onboarded: false,
        };
        let fields = profile.to_fields();
        assert_eq!(fields["photoURL"], "file:///p.png");
        assert_eq!(fields["username"], "ana");
    }
}
