//! User profile repository.
//!
//! # Invariants
//! - Profile fields share the `users/{userId}` node with the user's
//!   collections, so profile writes always use `update`.
//! - A user node without a `username` has no profile yet.

use crate::model::ids::UserId;
use crate::model::user::UserProfile;
use crate::repo::{decode, paths, RepoResult};
use crate::store::DocumentStore;
use serde_json::{Map, Value};

/// Partial profile update; `photo_url: Some(None)` clears the photo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<Option<String>>,
    pub onboarded: Option<bool>,
}

impl ProfilePatch {
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(username) = &self.username {
            fields.insert("username".into(), Value::from(username.as_str()));
        }
        if let Some(email) = &self.email {
            fields.insert("email".into(), Value::from(email.as_str()));
        }
        if let Some(photo_url) = &self.photo_url {
            fields.insert(
                "photoURL".into(),
                photo_url
                    .as_deref()
                    .map_or(Value::Null, Value::from),
            );
        }
        if let Some(onboarded) = self.onboarded {
            fields.insert("onboarded".into(), Value::from(onboarded));
        }
        fields
    }
}

/// Repository interface for user profiles.
pub trait UserRepository {
    /// Writes every profile field, keeping the user's collections.
    fn save_profile(&self, user_id: &UserId, profile: &UserProfile) -> RepoResult<()>;
    fn get_profile(&self, user_id: &UserId) -> RepoResult<Option<UserProfile>>;
    fn update_profile(&self, user_id: &UserId, patch: &ProfilePatch) -> RepoResult<()>;
    /// Removes the user node including all goals, tasks and journal entries.
    fn delete_user(&self, user_id: &UserId) -> RepoResult<()>;
}

/// Profile repository over any `DocumentStore`.
pub struct StoreUserRepository<S> {
    store: S,
}

impl<S: DocumentStore> StoreUserRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DocumentStore> UserRepository for StoreUserRepository<S> {
    fn save_profile(&self, user_id: &UserId, profile: &UserProfile) -> RepoResult<()> {
        let path = paths::user(user_id)?;
        let mut fields = profile.to_fields();
        if profile.photo_url.is_none() {
            fields.insert("photoURL".into(), Value::Null);
        }
        self.store.update(&path, &fields)?;
        Ok(())
    }

    fn get_profile(&self, user_id: &UserId) -> RepoResult<Option<UserProfile>> {
        let path = paths::user(user_id)?;
        let Some(Value::Object(mut node)) = self.store.get(&path)? else {
            return Ok(None);
        };
        if !node.contains_key("username") {
            return Ok(None);
        }
        for collection in [paths::GOALS, paths::TASKS, paths::JOURNAL] {
            node.remove(collection);
        }
        Ok(Some(decode(&path, Value::Object(node))?))
    }

    fn update_profile(&self, user_id: &UserId, patch: &ProfilePatch) -> RepoResult<()> {
        self.store.update(&paths::user(user_id)?, &patch.to_fields())?;
        Ok(())
    }

    fn delete_user(&self, user_id: &UserId) -> RepoResult<()> {
        self.store.remove(&paths::user(user_id)?)?;
        Ok(())
    }
}
