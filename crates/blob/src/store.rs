use async_trait::async_trait;
use bytes::Bytes;

use huddle_core::BlobName;

use crate::error::BlobError;

/// Storage backend for uploaded document bytes.
///
/// The document store never writes upload bytes itself; an upload handler
/// stages them through [`stage`](BlobStore::stage) before the store registers
/// the result in meeting metadata. The store is the sole party that deletes
/// blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under a fresh server-generated name and return it.
    ///
    /// The original uploaded filename is accepted for tracing only; it never
    /// influences the generated name.
    async fn stage(&self, original_name: &str, data: Bytes) -> Result<BlobName, BlobError>;

    /// Read the full contents of a blob.
    async fn read(&self, name: &BlobName) -> Result<Bytes, BlobError>;

    /// Delete a blob. Returns `true` if the blob existed.
    async fn delete(&self, name: &BlobName) -> Result<bool, BlobError>;

    /// Check whether a blob is physically present.
    async fn exists(&self, name: &BlobName) -> Result<bool, BlobError>;

    /// List every blob currently in the area.
    ///
    /// Used by the orphan sweep; may be expensive on large areas.
    async fn list(&self) -> Result<Vec<BlobName>, BlobError>;
}
