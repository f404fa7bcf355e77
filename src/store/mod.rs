//! Document store adapter.
//!
//! The service never keeps authoritative copies of its data. Every operation is
//! a single call into a [`DocumentStore`], which owns three collections:
//! - `requests`: queued song requests
//! - `api_keys`: credentials accepted by the access gate
//! - `configs`: named settings such as the intake switch
//!
//! Toggles are expressed as single atomic update-and-return operations so that
//! concurrent toggles of the same document serialize inside the store.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    api_key::ApiKey,
    configuration::Configuration,
    song_request::{NewSongRequest, SongRequest},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failure reported by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query against PostgreSQL failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend cannot serve requests at the moment.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration document exists but does not hold a boolean.
    #[error("configuration '{name}' holds a {kind}, expected a bool")]
    NotBoolean { name: String, kind: &'static str },
}

/// Operations the service needs from its persistence layer.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap round-trip used by the health check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Page of requests ordered by `updated_at` descending.
    async fn find_requests(&self, skip: i64, limit: i64) -> Result<Vec<SongRequest>, StoreError>;

    /// Total number of requests.
    async fn count_requests(&self) -> Result<i64, StoreError>;

    /// Insert a request and return it with its assigned identity.
    async fn insert_request(&self, request: NewSongRequest) -> Result<SongRequest, StoreError>;

    /// Atomically flip `done`, bump `updated_at` and return the new document.
    ///
    /// `Ok(None)` when no request has this id.
    async fn toggle_request(&self, id: Uuid) -> Result<Option<SongRequest>, StoreError>;

    /// Atomically remove a request, returning what was removed.
    async fn delete_request(&self, id: Uuid) -> Result<Option<SongRequest>, StoreError>;

    /// API key whose value equals `value` exactly.
    async fn find_api_key(&self, value: &str) -> Result<Option<ApiKey>, StoreError>;

    /// Configuration document by name.
    async fn find_config(&self, name: &str) -> Result<Option<Configuration>, StoreError>;

    /// Atomically negate a boolean configuration value and return the new document.
    ///
    /// `Ok(None)` when no document has this name, [`StoreError::NotBoolean`]
    /// when the stored value is not a bool.
    async fn toggle_config(&self, name: &str) -> Result<Option<Configuration>, StoreError>;
}
