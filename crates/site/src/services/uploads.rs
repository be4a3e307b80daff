//! Listing image storage.
//!
//! Uploaded images land in the configured upload directory under a random
//! filename; the database stores only the public `/uploads/...` reference.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Accepted image file extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Errors from storing or removing uploaded images.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded listing images on the local filesystem.
pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    /// Create a service rooted at `dir`. The directory is created lazily on
    /// first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save image bytes under a random filename, keyed by the original
    /// file's extension.
    ///
    /// Returns the public reference (e.g. `/uploads/3f2a....png`) to store
    /// on the listing.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` if the original filename has
    /// no accepted image extension, `UploadError::Io` if the write fails.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let ext = extension_of(original_name)
            .ok_or_else(|| UploadError::UnsupportedType(original_name.to_owned()))?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        Ok(format!("{UPLOADS_URL_PREFIX}{filename}"))
    }

    /// Remove a previously stored image by its public reference. Unknown or
    /// foreign references are ignored.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the file exists but cannot be removed.
    pub async fn delete(&self, image_ref: &str) -> Result<(), UploadError> {
        let Some(filename) = image_ref.strip_prefix(UPLOADS_URL_PREFIX) else {
            return Ok(());
        };
        // Reject anything that could escape the upload directory
        if filename.contains('/') || filename.contains("..") {
            return Ok(());
        }

        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn extension_of(name: &str) -> Option<&'static str> {
    let ext = name.rsplit('.').next()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|&&allowed| allowed == ext)
        .copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_whitelist() {
        assert_eq!(extension_of("photo.PNG"), Some("png"));
        assert_eq!(extension_of("archive.tar.gz"), None);
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("script.sh"), None);
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tradepost-uploads-{}", Uuid::new_v4()));
        let service = UploadService::new(&dir);

        let image_ref = service.save("item.png", b"not-really-a-png").await.unwrap();
        assert!(image_ref.starts_with(UPLOADS_URL_PREFIX));
        assert!(image_ref.ends_with(".png"));

        let filename = image_ref.strip_prefix(UPLOADS_URL_PREFIX).unwrap();
        assert!(dir.join(filename).exists());

        service.delete(&image_ref).await.unwrap();
        assert!(!dir.join(filename).exists());

        // Deleting again (or a foreign ref) is a no-op
        service.delete(&image_ref).await.unwrap();
        service.delete("https://elsewhere/img.png").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_unknown_type() {
        let service = UploadService::new(std::env::temp_dir());
        let err = service.save("malware.exe", b"nope").await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }
}
