use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crypto;
use crate::models::AppData;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no local data directory on this system")]
    NoDataDir,
}

/// Encrypted file holding one user's profile and period log.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the platform's local data directory.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        Ok(dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("hercycle")
            .join("data.hercycle"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, passphrase: &str, data: &AppData) -> Result<(), StorageError> {
        let json = zeroize::Zeroizing::new(serde_json::to_vec(data)?);
        let sealed = crypto::seal(passphrase, &json)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, sealed)?;
        debug!(path = %self.path.display(), entries = data.entries.len(), "store saved");
        Ok(())
    }

    pub fn load(&self, passphrase: &str) -> Result<AppData, StorageError> {
        let sealed = fs::read(&self.path)?;
        let json = crypto::open(passphrase, &sealed)?;
        let data: AppData = serde_json::from_slice(&json)?;
        debug!(path = %self.path.display(), entries = data.entries.len(), "store loaded");
        Ok(data)
    }

    /// Delete the store file permanently.
    pub fn wipe(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "store wiped");
        }
        Ok(())
    }
}
