//! In-memory document store.
//!
//! Used for local development (`STORE_BACKEND=memory`) and by the test suite.
//! Each collection sits behind its own `RwLock`; a toggle holds the write lock
//! for the whole read-flip-return sequence, which makes it atomic with respect
//! to other callers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::models::{
    api_key::ApiKey,
    configuration::{ACCEPTING, ConfigValue, Configuration},
    song_request::{NewSongRequest, SongRequest, next_updated_at},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    requests: Arc<RwLock<HashMap<Uuid, SongRequest>>>,
    api_keys: Arc<RwLock<Vec<ApiKey>>>,
    configs: Arc<RwLock<Vec<Configuration>>>,
    unavailable: AtomicBool,
    operations: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with API keys and, optionally, the intake switch.
    pub fn seeded<I, S>(api_keys: I, accepting: Option<bool>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        let keys: Vec<ApiKey> = api_keys
            .into_iter()
            .map(|value| ApiKey::new(value, now))
            .collect();
        let configs: Vec<Configuration> = accepting
            .map(|value| Configuration::new(ACCEPTING, ConfigValue::Bool(value), now))
            .into_iter()
            .collect();

        Self {
            api_keys: Arc::new(RwLock::new(keys)),
            configs: Arc::new(RwLock::new(configs)),
            ..Self::default()
        }
    }

    /// Insert or replace a configuration document.
    pub async fn put_config(&self, name: &str, value: ConfigValue) {
        let mut configs = self.configs.write().await;
        let now = Utc::now();

        match configs.iter_mut().find(|config| config.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.updated_at = next_updated_at(existing.updated_at, now);
            }
            None => configs.push(Configuration::new(name, value, now)),
        }
    }

    /// Simulate an outage: while set, every operation fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of operations issued against the store so far.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.begin()
    }

    async fn find_requests(&self, skip: i64, limit: i64) -> Result<Vec<SongRequest>, StoreError> {
        self.begin()?;
        let requests = self.requests.read().await;

        let mut sorted: Vec<&SongRequest> = requests.values().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(sorted.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count_requests(&self) -> Result<i64, StoreError> {
        self.begin()?;
        let requests = self.requests.read().await;

        Ok(requests.len() as i64)
    }

    async fn insert_request(&self, request: NewSongRequest) -> Result<SongRequest, StoreError> {
        self.begin()?;
        let mut requests = self.requests.write().await;

        let created = request.into_song_request(Uuid::new_v4());
        requests.insert(created.id, created.clone());

        Ok(created)
    }

    async fn toggle_request(&self, id: Uuid) -> Result<Option<SongRequest>, StoreError> {
        self.begin()?;
        let mut requests = self.requests.write().await;

        Ok(requests.get_mut(&id).map(|request| {
            request.done = !request.done;
            request.updated_at = next_updated_at(request.updated_at, Utc::now());
            request.clone()
        }))
    }

    async fn delete_request(&self, id: Uuid) -> Result<Option<SongRequest>, StoreError> {
        self.begin()?;
        let mut requests = self.requests.write().await;

        Ok(requests.remove(&id))
    }

    async fn find_api_key(&self, value: &str) -> Result<Option<ApiKey>, StoreError> {
        self.begin()?;
        let api_keys = self.api_keys.read().await;

        Ok(api_keys.iter().find(|key| key.value == value).cloned())
    }

    async fn find_config(&self, name: &str) -> Result<Option<Configuration>, StoreError> {
        self.begin()?;
        let configs = self.configs.read().await;

        Ok(configs.iter().find(|config| config.name == name).cloned())
    }

    async fn toggle_config(&self, name: &str) -> Result<Option<Configuration>, StoreError> {
        self.begin()?;
        let mut configs = self.configs.write().await;

        let Some(config) = configs.iter_mut().find(|config| config.name == name) else {
            return Ok(None);
        };

        let Some(current) = config.value.as_bool() else {
            return Err(StoreError::NotBoolean {
                name: config.name.clone(),
                kind: config.value.kind(),
            });
        };

        config.value = ConfigValue::Bool(!current);
        config.updated_at = next_updated_at(config.updated_at, Utc::now());

        Ok(Some(config.clone()))
    }
}
