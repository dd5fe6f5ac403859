//! [`ObjectStorage`] over the `object_store` crate.
//!
//! [`ObjectStoreBackend`] binds one bucket-like store and exposes the
//! get/put/list operations the connector needs. Three flavours are provided:
//!
//! - [`ObjectStoreBackend::s3`]: any S3-compatible endpoint (AWS S3, MinIO, Ceph)
//! - [`ObjectStoreBackend::in_memory`]: a process-local store for tests
//! - [`ObjectStoreBackend::local`]: a directory on the local filesystem
//!
//! Listing is a plain string-prefix match. `object_store` lists by path
//! segment, so the backend lists the enclosing directory of the prefix and
//! filters the keys itself. The listing stream follows continuation tokens,
//! so arbitrarily large listings are returned in full.
//!
//! Keys are used verbatim: a key is never percent-encoded or normalised, so
//! the key passed to `put` is the key `list` returns. Keys `object_store`
//! cannot represent unchanged (leading or trailing `/`, empty segments, `.`
//! or `..` segments, control characters) are rejected with
//! [`XetraError::Config`].

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::{debug, instrument};
use url::Url;

use xetra_core::error::XetraError;
use xetra_core::storage::ObjectStorage;
use xetra_core::{ConnectorConfig, Result};

/// An [`ObjectStorage`] backed by any `object_store` implementation.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreBackend {
    /// Create a backend for the bucket described by `config`.
    ///
    /// Credentials are validated locally (empty values are rejected with
    /// [`XetraError::Authentication`]); no request is sent. An endpoint that
    /// is not a valid URL fails with [`XetraError::Connectivity`].
    pub fn s3(config: &ConnectorConfig) -> Result<Self> {
        config.validate()?;

        Url::parse(&config.endpoint_url).map_err(|e| {
            XetraError::connectivity(&config.endpoint_url, "invalid endpoint URL", e)
        })?;

        let creds = &config.credentials;
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_endpoint(&config.endpoint_url)
            .with_region(config.region_or_default())
            .with_access_key_id(&creds.access_key_id)
            .with_secret_access_key(&creds.secret_access_key)
            .with_allow_http(config.allows_http());

        if let Some(token) = &creds.session_token {
            builder = builder.with_token(token);
        }

        let store = builder.build().map_err(|e| {
            XetraError::connectivity(
                &config.endpoint_url,
                format!("failed to create S3 client for bucket {}", config.bucket),
                e,
            )
        })?;

        debug!(
            endpoint = %config.endpoint_url,
            bucket = %config.bucket,
            region = %config.region_or_default(),
            "S3 backend initialised"
        );

        Ok(Self::from_store(Arc::new(store)))
    }

    /// Create an empty in-memory backend.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()))
    }

    /// Create a backend rooted at a local directory.
    ///
    /// The directory is created if it does not exist.
    pub async fn local(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        tokio::fs::create_dir_all(&base_dir).await.map_err(|e| {
            XetraError::storage(
                format!("Failed to create base directory: {}", base_dir.display()),
                e,
            )
        })?;
        let store = LocalFileSystem::new_with_prefix(&base_dir).map_err(|e| {
            XetraError::storage(
                format!("Failed to open local store at {}", base_dir.display()),
                e,
            )
        })?;
        debug!(base_dir = %base_dir.display(), "Local backend initialised");
        Ok(Self::from_store(Arc::new(store)))
    }

    /// Wrap an already-built store.
    pub fn from_store(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

/// Parse `key` into a store path without re-encoding it.
fn object_path(key: &str) -> Result<ObjectPath> {
    if key.is_empty() {
        return Err(XetraError::Config {
            message: "object key must not be empty".to_string(),
        });
    }
    let path = ObjectPath::parse(key).map_err(|e| XetraError::Config {
        message: format!("invalid object key '{key}': {e}"),
    })?;
    let raw: &str = path.as_ref();
    if raw != key {
        return Err(XetraError::Config {
            message: format!("invalid object key '{key}': leading or trailing '/'"),
        });
    }
    Ok(path)
}

/// The directory part of a prefix: everything before the last `/`.
///
/// `"prefix/te"` -> `Some("prefix")`, `"te"` -> `None`. A root no valid key
/// can live under (`"a//b"`, `"/x"`) is an error.
fn listing_root(prefix: &str) -> Result<Option<ObjectPath>> {
    match prefix.rfind('/') {
        Some(idx) => object_path(&prefix[..idx]).map(Some),
        None => Ok(None),
    }
}

/// Map a backend error, keeping credential failures distinct.
fn store_error(e: object_store::Error, context: impl FnOnce() -> String) -> XetraError {
    match e {
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => XetraError::Authentication {
            message: format!("{}: {e}", context()),
        },
        other => XetraError::storage(context(), other),
    }
}

#[async_trait]
impl ObjectStorage for ObjectStoreBackend {
    #[instrument(skip(self, data), fields(key = %key, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = object_path(key)?;
        self.store
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| store_error(e, || format!("put failed for {key}")))?;
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = object_path(key)?;
        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => XetraError::NotFound {
                key: key.to_string(),
            },
            other => store_error(other, || format!("get failed for {key}")),
        })?;
        let bytes = result
            .bytes()
            .await
            .map_err(|e| store_error(e, || format!("get bytes failed for {key}")))?;
        debug!("Get {} bytes from {}", bytes.len(), key);
        Ok(bytes)
    }

    #[instrument(skip(self), fields(prefix = %prefix))]
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let root = match listing_root(prefix) {
            Ok(root) => root,
            Err(e) => {
                debug!("No key can start with '{}': {}", prefix, e);
                return Ok(Vec::new());
            }
        };
        let mut stream = self.store.list(root.as_ref());

        let mut results = Vec::new();
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| store_error(e, || format!("list failed for prefix {prefix}")))?
        {
            let key: &str = meta.location.as_ref();
            if key.starts_with(prefix) {
                results.push(key.to_string());
            }
        }

        debug!("Listed {} keys with prefix '{}'", results.len(), prefix);
        Ok(results)
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = object_path(key)?;
        match self.store.delete(&path).await {
            Ok(()) => Ok(()),
            // S3 deletes are idempotent; the local store reports NotFound
            Err(object_store::Error::NotFound { .. }) => {
                debug!("Delete {}: already absent", key);
                Ok(())
            }
            Err(e) => Err(store_error(e, || format!("delete failed for {key}"))),
        }
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn exists(&self, key: &str) -> Result<bool> {
        let path = object_path(key)?;
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(store_error(e, || format!("head failed for {key}"))),
        }
    }
}
