//! Binary object storage for profile images.
//!
//! # Responsibility
//! - Define the upload contract (`put` bytes, get back a retrievable URL).
//! - Provide a directory-backed implementation for local runs and tests.
//!
//! # Invariants
//! - Object keys are relative `/`-separated names of `[A-Za-z0-9._-]`
//!   segments; `.` and `..` are rejected.
//! - Uploads are not retried.

use crate::model::ids::UserId;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Largest accepted profile image.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

static KEY_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid blob key regex"));

pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Debug)]
pub enum BlobError {
    InvalidKey(String),
    UnsupportedContentType(String),
    TooLarge { size: usize, max: usize },
    Io(std::io::Error),
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid blob key `{key}`"),
            Self::UnsupportedContentType(value) => {
                write!(f, "unsupported image content type `{value}`")
            }
            Self::TooLarge { size, max } => {
                write!(f, "blob of {size} bytes exceeds limit of {max} bytes")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlobError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Upload side of an external object store.
pub trait BlobStore {
    /// Stores `bytes` under `key` (overwriting) and returns its URL.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> BlobResult<String>;
}

/// File extension for an accepted profile image content type.
pub fn image_extension(content_type: &str) -> BlobResult<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        other => Err(BlobError::UnsupportedContentType(other.to_string())),
    }
}

/// Fresh object key for a user's profile image.
pub fn profile_image_key(user_id: &UserId, content_type: &str) -> BlobResult<String> {
    let extension = image_extension(content_type)?;
    Ok(format!(
        "profile-images/{}/{}.{extension}",
        user_id.as_str(),
        Uuid::new_v4()
    ))
}

fn validate_key(key: &str) -> BlobResult<Vec<&str>> {
    let segments = key.split('/').collect::<Vec<_>>();
    let valid = !segments.is_empty()
        && segments.iter().all(|segment| {
            *segment != "." && *segment != ".." && KEY_SEGMENT_RE.is_match(segment)
        });
    if valid {
        Ok(segments)
    } else {
        Err(BlobError::InvalidKey(key.to_string()))
    }
}

/// Blob store writing objects below a root directory.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local file for `key`.
    pub fn object_path(&self, key: &str) -> BlobResult<PathBuf> {
        let mut path = self.root.clone();
        for segment in validate_key(key)? {
            path.push(segment);
        }
        Ok(path)
    }
}

impl BlobStore for DirBlobStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> BlobResult<String> {
        let started_at = Instant::now();
        let target = self.object_path(key)?;
        let result = write_object(&target, bytes);
        match result {
            Ok(()) => {
                info!(
                    "event=blob_put module=blob status=ok content_type={} size_bytes={} duration_ms={}",
                    content_type,
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(format!("file://{}", target.display()))
            }
            Err(err) => {
                error!(
                    "event=blob_put module=blob status=error size_bytes={} duration_ms={} error={}",
                    bytes.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

fn write_object(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let staging = target.with_extension("partial");
    std::fs::write(&staging, bytes)?;
    std::fs::rename(&staging, target)
}

#[cfg(test)]
mod tests {
    use super::{image_extension, profile_image_key, BlobError, BlobStore, DirBlobStore};

    #[test]
    fn put_writes_file_and_returns_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());
        let url = store
            .put("profile-images/u1/a.png", b"png-bytes", "image/png")
            .unwrap();

        let expected = dir.path().join("profile-images").join("u1").join("a.png");
        assert_eq!(std::fs::read(&expected).unwrap(), b"png-bytes");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("a.png"));
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());
        for key in ["../x.png", "a//b", "/abs.png", "a/./b"] {
            assert!(
                matches!(store.put(key, b"x", "image/png"), Err(BlobError::InvalidKey(_))),
                "{key} should be rejected"
            );
        }
    }

    #[test]
    fn profile_keys_carry_extension_for_known_types() {
        let user = "u1".parse().unwrap();
        let key = profile_image_key(&user, "IMAGE/JPEG").unwrap();
        assert!(key.starts_with("profile-images/u1/"));
        assert!(key.ends_with(".jpg"));
        assert!(image_extension("application/pdf").is_err());
    }
}
