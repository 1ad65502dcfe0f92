//! Local-file state repository.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use dirsync_core::{StateError, StateRepository};
use dirsync_model::State;

/// Stores the state document as a JSON file.
///
/// Writes go through a sibling temp file followed by a rename, so readers
/// never observe a half-written document.
pub struct DiskStateRepository {
    path: PathBuf,
}

impl DiskStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateRepository for DiskStateRepository {
    async fn get_state(&self) -> Result<State, StateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateError::NotFound)
            }
            Err(err) => {
                return Err(StateError::storage_with_source(
                    format!("reading state file {}", self.path.display()),
                    err,
                ))
            }
        };

        let state = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), "loaded state from disk");
        Ok(state)
    }

    async fn set_state(&self, state: &State) -> Result<(), StateError> {
        let payload = serde_json::to_vec_pretty(state)?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &payload).await.map_err(|err| {
            StateError::storage_with_source(
                format!("writing state file {}", tmp_path.display()),
                err,
            )
        })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| {
                StateError::storage_with_source(
                    format!("replacing state file {}", self.path.display()),
                    err,
                )
            })?;

        debug!(path = %self.path.display(), bytes = payload.len(), "stored state to disk");
        Ok(())
    }
}
