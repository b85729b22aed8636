//! Uploaded image references.
//!
//! Files are stored by an external storage collaborator; records only keep the
//! relative path produced by `upload_path`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserImageId = i64;

/// Upload destinations, one directory each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    UserImage,
    Activity,
    Notification,
}

impl UploadKind {
    fn directory(self) -> &'static str {
        match self {
            Self::UserImage => "user_images",
            Self::Activity => "activities",
            Self::Notification => "notifications",
        }
    }
}

/// Builds a collision-free storage path for an uploaded file, keeping the
/// original extension (lowercased) when it has one.
pub fn upload_path(prefix: &str, kind: UploadKind, original_filename: &str) -> String {
    let extension = std::path::Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|ch| ch.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{prefix}{}/{}{extension}", kind.directory(), Uuid::new_v4())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserImage {
    pub id: UserImageId,
    pub image: String,
}

impl UserImage {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            id: 0,
            image: image.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{upload_path, UploadKind};

    #[test]
    fn upload_path_keeps_prefix_directory_and_extension() {
        let path = upload_path("uploaded/", UploadKind::Activity, "Screen Shot.PNG");
        assert!(path.starts_with("uploaded/activities/"));
        assert!(path.ends_with(".png"));

        let other = upload_path("uploaded/", UploadKind::Activity, "Screen Shot.PNG");
        assert_ne!(path, other);

        let bare = upload_path("", UploadKind::UserImage, "noext");
        assert!(bare.starts_with("user_images/"));
        assert!(!bare.contains('.'));
    }
}
