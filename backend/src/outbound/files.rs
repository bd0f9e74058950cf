//! Filesystem adapters rooted in capability directories.
//!
//! Each adapter holds a `cap_std` directory handle, so paths handed to it can
//! never escape the configured root. Blocking calls run on the blocking pool.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::UploadName;
use crate::domain::ports::{ModelArtifacts, ModelInfoSource, UploadStore, UploadStoreError};

const MODEL_CONFIG: &str = "config.json";
const MODEL_WEIGHTS: &str = "pytorch_model.bin";

/// Uploaded images stored as plain files in one directory.
pub struct CapStdUploadStore {
    dir: Arc<Dir>,
}

impl CapStdUploadStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    /// Fails when the directory cannot be created or opened.
    pub fn open(root: &Path) -> Result<Self, UploadStoreError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(root, ambient_authority()))
            .map(|dir| Self { dir: Arc::new(dir) })
            .map_err(|err| UploadStoreError::unavailable(format!("{}: {err}", root.display())))
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, UploadStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| UploadStoreError::io(err.to_string()))?
            .map_err(|err| UploadStoreError::io(err.to_string()))
    }
}

#[async_trait]
impl UploadStore for CapStdUploadStore {
    async fn save(&self, name: &UploadName, bytes: Vec<u8>) -> Result<(), UploadStoreError> {
        let file = name.as_str().to_owned();
        debug!(file = %file, size = bytes.len(), "storing upload");
        self.blocking(move |dir| dir.write(file, bytes)).await
    }

    async fn load(&self, name: &UploadName) -> Result<Option<Vec<u8>>, UploadStoreError> {
        let file = name.as_str().to_owned();
        self.blocking(move |dir| match dir.read(file) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        })
        .await
    }
}

/// Reads `config.json` and the weights size from the trained model directory.
pub struct CapStdModelInfoSource {
    root: std::path::PathBuf,
}

impl CapStdModelInfoSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn read_artifacts(root: &Path) -> Option<ModelArtifacts> {
    let dir = Dir::open_ambient_dir(root, ambient_authority()).ok()?;
    let weights_bytes = dir.metadata(MODEL_WEIGHTS).map(|m| m.len()).ok();
    let config = match dir.read(MODEL_CONFIG) {
        Ok(raw) => Some(serde_json::from_slice::<Value>(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "model config is not valid JSON");
            json!({})
        })),
        Err(_) => None,
    };
    if weights_bytes.is_none() && config.is_none() {
        return None;
    }
    Some(ModelArtifacts {
        config: config.unwrap_or_else(|| json!({})),
        weights_bytes: weights_bytes.unwrap_or_default(),
    })
}

#[async_trait]
impl ModelInfoSource for CapStdModelInfoSource {
    async fn artifacts(&self) -> Option<ModelArtifacts> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || read_artifacts(&root))
            .await
            .ok()
            .flatten()
    }
}
