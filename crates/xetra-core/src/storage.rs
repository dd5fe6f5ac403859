//! The ObjectStorage trait, the single interface to the bucket.
//!
//! The connector never talks to S3 or the filesystem directly; every
//! object operation goes through this trait. Implementations live in
//! `xetra-storage`.

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

/// Object operations on one bound bucket.
///
/// Keys are relative to the bucket root. Implementations must be
/// `Send + Sync` so a single connector can serve concurrent callers.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object. Overwrites if it already exists.
    ///
    /// A single `put` is the atomicity boundary: readers observe either the
    /// previous object or the complete new one.
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Read an object. Returns [`XetraError::NotFound`](crate::XetraError::NotFound)
    /// if the key does not exist.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// List all object keys that start with `prefix`, in backend order.
    ///
    /// An empty result is not an error. Implementations follow pagination
    /// internally and return the fully materialised listing.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete an object. Does not error if the key does not exist.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if an object exists at the given key.
    async fn exists(&self, key: &str) -> Result<bool>;
}
