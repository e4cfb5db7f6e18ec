//! Account and onboarding use-case service.
//!
//! # Responsibility
//! - Create the profile record on onboarding and keep it editable.
//! - Upload profile photos and mirror the URL into both the profile record
//!   and the identity provider.
//!
//! # Invariants
//! - Every operation acts on the signed-in identity; there is no way to
//!   write another user's profile through this service.
//! - A failed upload leaves the profile untouched. A failed profile write
//!   after a successful upload leaves an unreferenced blob behind.

use crate::blob::{profile_image_key, BlobError, BlobStore, MAX_PROFILE_IMAGE_BYTES};
use crate::model::now_epoch_ms;
use crate::model::user::UserProfile;
use crate::repo::user_repo::{ProfilePatch, UserRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::session::{Identity, SessionProvider};
use log::{info, warn};

pub const MAX_USERNAME_CHARS: usize = 50;

/// Profile service bound to a session provider.
pub struct ProfileService<'s, U: UserRepository, B: BlobStore> {
    users: U,
    blobs: B,
    session: &'s SessionProvider,
}

impl<'s, U: UserRepository, B: BlobStore> ProfileService<'s, U, B> {
    pub fn new(users: U, blobs: B, session: &'s SessionProvider) -> Self {
        Self {
            users,
            blobs,
            session,
        }
    }

    /// Profile of the signed-in user, `None` before onboarding.
    pub fn get_profile(&self) -> ServiceResult<Option<UserProfile>> {
        let identity = self.session.require_identity()?;
        Ok(self.users.get_profile(&identity.user_id)?)
    }

    /// Whether the signed-in user has finished onboarding.
    pub fn is_onboarded(&self) -> ServiceResult<bool> {
        Ok(self
            .get_profile()?
            .map_or(false, |profile| profile.onboarded))
    }

    /// Writes the profile record and marks the user onboarded.
    ///
    /// Re-running keeps the original `createdAt`.
    pub fn complete_onboarding(&self, username: &str) -> ServiceResult<UserProfile> {
        let identity = self.session.require_identity()?;
        let username = normalize_username(username)?;
        let created_at = self
            .users
            .get_profile(&identity.user_id)?
            .map_or_else(now_epoch_ms, |existing| existing.created_at);

        let profile = UserProfile {
            username: username.clone(),
            email: identity.email.clone(),
            photo_url: identity.photo_url.clone(),
            created_at,
            onboarded: true,
        };
        self.users.save_profile(&identity.user_id, &profile)?;
        self.session.update_profile(Some(username), None)?;
        info!("event=onboarding_complete module=service status=ok");
        Ok(profile)
    }

    pub fn update_username(&self, username: &str) -> ServiceResult<UserProfile> {
        let identity = self.session.require_identity()?;
        let username = normalize_username(username)?;
        self.require_profile(&identity)?;
        let patch = ProfilePatch {
            username: Some(username.clone()),
            ..ProfilePatch::default()
        };
        self.users.update_profile(&identity.user_id, &patch)?;
        self.session.update_profile(Some(username), None)?;
        self.require_profile(&identity)
    }

    /// Uploads a new profile photo and returns its URL.
    pub fn upload_photo(&self, bytes: &[u8], content_type: &str) -> ServiceResult<String> {
        let identity = self.session.require_identity()?;
        if bytes.is_empty() {
            return Err(ServiceError::Validation("photo is empty".to_string()));
        }
        if bytes.len() > MAX_PROFILE_IMAGE_BYTES {
            return Err(BlobError::TooLarge {
                size: bytes.len(),
                max: MAX_PROFILE_IMAGE_BYTES,
            }
            .into());
        }

        let key = profile_image_key(&identity.user_id, content_type)?;
        let url = self.blobs.put(&key, bytes, content_type)?;
        let patch = ProfilePatch {
            photo_url: Some(Some(url.clone())),
            ..ProfilePatch::default()
        };
        if let Err(err) = self.users.update_profile(&identity.user_id, &patch) {
            warn!(
                "event=profile_photo module=service status=error stage=profile_write error={}",
                err
            );
            return Err(err.into());
        }
        self.session.update_profile(None, Some(url.clone()))?;
        info!(
            "event=profile_photo module=service status=ok size_bytes={}",
            bytes.len()
        );
        Ok(url)
    }

    /// Deletes the user's node (profile and every collection), then signs out.
    ///
    /// Community posts are authored content and are kept.
    pub fn delete_account(&self) -> ServiceResult<()> {
        let identity = self.session.require_identity()?;
        self.users.delete_user(&identity.user_id)?;
        self.session.sign_out();
        info!("event=account_delete module=service status=ok");
        Ok(())
    }

    fn require_profile(&self, identity: &Identity) -> ServiceResult<UserProfile> {
        self.users
            .get_profile(&identity.user_id)?
            .ok_or_else(|| ServiceError::not_found("profile", &identity.user_id))
    }
}

fn normalize_username(value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_USERNAME_CHARS {
        return Err(ServiceError::Validation(format!(
            "username exceeds {MAX_USERNAME_CHARS} characters"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ServiceError::Validation(
            "username must not contain control characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
