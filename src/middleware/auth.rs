//! API key authentication gate.
//!
//! This gate runs in front of every protected route to:
//! 1. Extract the API key from the `x-api-key` header
//! 2. Verify a key with exactly that value exists in the store
//! 3. Reject everything else with HTTP 401

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::Gate;
use crate::{error::AppError, models::api_key::fingerprint, store::DocumentStore};

/// Header carrying the credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Admits requests presenting a known API key.
///
/// # Flow
///
/// 1. Read `x-api-key`; missing, empty or non-UTF-8 values are rejected
///    without touching the store
/// 2. Look up a key with exactly that value
/// 3. Found: admit. Not found or lookup failed: reject (fail closed)
///
/// # Headers
///
/// Expected header format:
/// ```text
/// x-api-key: abc123xyz
/// ```
pub struct AccessGate {
    store: Arc<dyn DocumentStore>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Gate for AccessGate {
    fn name(&self) -> &'static str {
        "access"
    }

    async fn check(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let Some(raw) = headers
            .get(API_KEY_HEADER)
            .filter(|value| !value.is_empty())
        else {
            tracing::warn!("rejected request without api key");
            return Err(AppError::Unauthorized);
        };

        // Keys are opaque; any UTF-8 is accepted, not just visible ASCII
        let Ok(api_key) = std::str::from_utf8(raw.as_bytes()) else {
            tracing::warn!("rejected api key that is not valid UTF-8");
            return Err(AppError::Unauthorized);
        };

        match self.store.find_api_key(api_key).await {
            Ok(Some(_)) => {
                tracing::debug!(key = %fingerprint(api_key), "api key accepted");
                Ok(())
            }
            Ok(None) => {
                tracing::warn!(key = %fingerprint(api_key), "rejected unknown api key");
                Err(AppError::Unauthorized)
            }
            Err(err) => {
                tracing::error!(key = %fingerprint(api_key), error = %err, "api key lookup failed");
                Err(AppError::Unauthorized)
            }
        }
    }
}
