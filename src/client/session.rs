//! Client session cache with an explicit load/save/clear lifecycle.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Everything the client caches after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub branch: String,
    pub mobile: String,
}

/// Persists a [`Session`] as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub async fn load(&self) -> anyhow::Result<Option<Session>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read session {}", self.path.display()))
            }
        };
        let session = serde_json::from_slice(&raw)
            .with_context(|| format!("corrupt session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    pub async fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("failed to write session {}", self.path.display()))
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load().await.unwrap(), None);

        let session = Session {
            token: "t".into(),
            username: "asha".into(),
            branch: "IT".into(),
            mobile: "9876543210".into(),
        };
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
