//! Connector configuration with pre-resolved credentials.
//!
//! [`ConnectorConfig`] carries everything needed to bind a connector to one
//! bucket. Secret values arrive already resolved; looking them up (from
//! environment variables, a vault, ...) is the caller's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::XetraError;
use crate::Result;

/// Access credentials for the object-storage service.
///
/// The secret and the session token are never printed by `Debug` and are
/// skipped when the config is serialized.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key identifier.
    pub access_key_id: String,

    /// Secret access key.
    #[serde(skip_serializing, default)]
    pub secret_access_key: String,

    /// Optional session token for temporary credentials.
    #[serde(skip_serializing, default)]
    pub session_token: Option<String>,
}

impl Credentials {
    /// Create credentials from an access key id and secret.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Reject empty credential values.
    pub fn validate(&self) -> Result<()> {
        if self.access_key_id.trim().is_empty() {
            return Err(XetraError::Authentication {
                message: "access key id is empty".into(),
            });
        }
        if self.secret_access_key.is_empty() {
            return Err(XetraError::Authentication {
                message: "secret access key is empty".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Configuration binding a connector to one bucket on one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Storage endpoint address, e.g. `https://s3.eu-central-1.amazonaws.com`.
    pub endpoint_url: String,

    /// Bucket name.
    pub bucket: String,

    /// Region used for request signing. Defaults to `us-east-1` when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Allow plain-HTTP endpoints (MinIO, localstack). Inferred from the
    /// endpoint scheme when unset.
    #[serde(default)]
    pub allow_http: Option<bool>,

    /// Resolved credentials.
    pub credentials: Credentials,
}

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

impl ConnectorConfig {
    /// Create a configuration for `bucket` on `endpoint_url`.
    pub fn new(
        endpoint_url: impl Into<String>,
        bucket: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            bucket: bucket.into(),
            region: None,
            allow_http: None,
            credentials,
        }
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Explicitly allow or forbid plain-HTTP endpoints.
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = Some(allow);
        self
    }

    /// The region to sign requests with.
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Whether plain HTTP is allowed for this endpoint.
    pub fn allows_http(&self) -> bool {
        self.allow_http
            .unwrap_or_else(|| self.endpoint_url.starts_with("http://"))
    }

    /// Check credentials first, then the endpoint and bucket fields.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        if self.endpoint_url.trim().is_empty() {
            return Err(XetraError::Config {
                message: "endpoint_url is empty".into(),
            });
        }
        if self.bucket.trim().is_empty() {
            return Err(XetraError::Config {
                message: "bucket name is empty".into(),
            });
        }
        Ok(())
    }
}
