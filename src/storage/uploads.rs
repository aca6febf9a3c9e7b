//! Listing images on local disk, served back under `/uploads`.

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// URL prefix the router mounts the upload directory on.
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Creates the directory if needed.
    pub async fn prepare(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            anyhow::anyhow!("failed to create upload dir {}: {}", dir.display(), e)
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the image and returns the stored file name
    /// (`{unix_millis}-{sanitized name}`).
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let base = sanitize_file_name(original_name);
        let mut file_name = format!("{}-{}", Utc::now().timestamp_millis(), base);

        let mut file = match self.create_new(&file_name).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let suffix = Uuid::new_v4().simple().to_string();
                file_name = format!("{}-{}-{}", Utc::now().timestamp_millis(), &suffix[..8], base);
                self.create_new(&file_name).await?
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(file_name)
    }

    /// Best-effort removal of an image whose listing was never saved.
    pub async fn remove(&self, file_name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!(file = %file_name, error = %e, "failed to remove orphaned upload");
        }
    }

    /// Checks the directory accepts writes; used by `preflight`.
    pub async fn probe_writable(&self) -> anyhow::Result<()> {
        let probe = self.dir.join(format!(".probe-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;
        Ok(())
    }

    async fn create_new(&self, file_name: &str) -> std::io::Result<tokio::fs::File> {
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dir.join(file_name))
            .await
    }
}

/// Public URL for a stored file, e.g. `http://host:5000/uploads/123-lamp.jpg`.
pub fn public_url(base_url: &str, file_name: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), UPLOADS_ROUTE, file_name)
}

/// Keeps the last path component and replaces anything outside
/// `[A-Za-z0-9._-]` so the name is safe on disk and in a URL.
pub fn sanitize_file_name(original: &str) -> String {
    let last = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("lamp.jpg"), "lamp.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\pics\\my photo.png"), "my_photo.png");
        assert_eq!(sanitize_file_name(".."), "image");
        assert_eq!(sanitize_file_name(""), "image");
    }

    #[test]
    fn public_url_joins_cleanly() {
        assert_eq!(
            public_url("http://localhost:5000/", "1-lamp.jpg"),
            "http://localhost:5000/uploads/1-lamp.jpg"
        );
    }

    #[tokio::test]
    async fn saved_files_land_in_the_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::prepare(dir.path().join("uploads")).await.unwrap();
        let name = store.save("lamp.jpg", b"fake image").await.unwrap();
        assert!(name.ends_with("-lamp.jpg"));
        let bytes = tokio::fs::read(store.dir().join(&name)).await.unwrap();
        assert_eq!(bytes, b"fake image");

        store.remove(&name).await;
        assert!(!store.dir().join(&name).exists());
    }
}
