use crate::session::SavedSession;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File-backed session store: one JSON blob per session under a root
/// directory, keyed by the session id.
///
/// Persistence failures are recoverable by design. A corrupt or unreadable
/// blob is reported as "no saved session" with a warning, never as a fatal
/// error to the in-memory recorder.
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create session store at {:?}", root))?;

        info!("Session store initialized: {}", root.display());

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, session_id: &str) -> PathBuf {
        self.root.join(format!("{session_id}.json"))
    }

    /// Persist a session, overwriting any previous blob under the same id.
    pub fn save(&self, session: &SavedSession) -> Result<PathBuf> {
        let path = self.blob_path(&session.session_id());
        let blob = serde_json::to_string_pretty(session)
            .context("Failed to serialize session")?;
        fs::write(&path, blob)
            .with_context(|| format!("Failed to write session blob: {:?}", path))?;

        info!("Session saved: {}", path.display());

        Ok(path)
    }

    /// Load a session by id.
    ///
    /// Returns `Ok(None)` when no blob exists or the blob cannot be parsed;
    /// the caller proceeds as if no saved session existed.
    pub fn load(&self, session_id: &str) -> Result<Option<SavedSession>> {
        let path = self.blob_path(session_id);
        if !path.exists() {
            return Ok(None);
        }

        let blob = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session blob: {:?}", path))?;

        match serde_json::from_str::<SavedSession>(&blob) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Discarding corrupt session blob {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Ids of every stored session, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read session store at {:?}", self.root))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Remove a stored session. Missing blobs are not an error.
    pub fn remove(&self, session_id: &str) -> Result<()> {
        let path = self.blob_path(session_id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session blob: {:?}", path))?;
            info!("Session removed: {}", path.display());
        }
        Ok(())
    }
}
