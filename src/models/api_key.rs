//! API Key model for authentication.
//!
//! API keys are opaque credentials stored verbatim. A request is authenticated
//! when a key with exactly the presented value exists; there is no expiry or scope.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Represents an API key record from the store.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `value`: The credential clients send in `x-api-key` (unique)
/// - `created_at`: When the key was created
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique identifier for this API key
    pub id: Uuid,

    /// The credential itself
    pub value: String,

    /// Timestamp when this API key was created
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn new(value: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            value: value.into(),
            created_at: now,
        }
    }
}

/// Short, non-reversible identifier of a credential for log lines.
///
/// First 12 hex characters of the SHA-256 digest.
pub fn fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(12);
    digest
}
