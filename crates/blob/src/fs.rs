use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use huddle_core::BlobName;

use crate::error::BlobError;
use crate::store::BlobStore;

/// Filesystem-backed blob area: one flat directory of uploaded files.
///
/// Blob names are server-generated UUID hex, so the directory never sees
/// user-controlled filenames.
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    /// Open a blob area rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory this area lives in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &BlobName) -> Result<PathBuf, BlobError> {
        validate_name(name)?;
        Ok(self.dir.join(name.as_str()))
    }
}

/// Reject anything that is not a plain single path segment.
fn validate_name(name: &BlobName) -> Result<(), BlobError> {
    let raw = name.as_str();
    if raw.is_empty()
        || raw == "."
        || raw == ".."
        || raw.contains('/')
        || raw.contains('\\')
        || raw.contains('\0')
    {
        return Err(BlobError::InvalidName(raw.to_owned()));
    }
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn stage(&self, original_name: &str, data: Bytes) -> Result<BlobName, BlobError> {
        let name = BlobName::new(Uuid::new_v4().simple().to_string());
        let path = self.dir.join(name.as_str());
        fs::write(&path, &data).await?;
        debug!(
            blob = %name,
            original = original_name,
            bytes = data.len(),
            "staged upload"
        );
        Ok(name)
    }

    async fn read(&self, name: &BlobName) -> Result<Bytes, BlobError> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &BlobName) -> Result<bool, BlobError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &BlobName) -> Result<bool, BlobError> {
        let path = self.path_for(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn list(&self) -> Result<Vec<BlobName>, BlobError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(BlobName::new(entry.file_name().to_string_lossy()));
            }
        }
        names.sort();
        Ok(names)
    }
}
