//! Song request service - Core logic for the request queue.
//!
//! This service handles:
//! - Pagination arithmetic and validation
//! - Building new requests (date key, defaults)
//! - Mapping store outcomes onto application errors
//!
//! # Atomicity Guarantees
//!
//! Toggle and delete are single store operations. The service never reads a
//! document and writes it back.

use chrono::{FixedOffset, Utc};
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::song_request::{CreateSongRequest, NewSongRequest, SongRequest},
    store::DocumentStore,
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
    skip: i64,
}

impl PageRequest {
    /// Validate `page` and `page_size`, applying defaults for missing values.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: either value is not strictly positive, or the
    ///   offset they describe does not fit in an `i64`
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Result<Self, AppError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page <= 0 || page_size <= 0 {
            return Err(bad_query_params());
        }

        let skip = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(bad_query_params)?;

        Ok(Self {
            page,
            page_size,
            skip,
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of documents to skip: `(page - 1) * page_size`.
    pub fn skip(&self) -> i64 {
        self.skip
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            skip: 0,
        }
    }
}

pub fn bad_query_params() -> AppError {
    AppError::InvalidRequest("bad query params".to_string())
}

/// Number of pages needed for `count` records, `ceil(count / page_size)`.
pub fn total_pages(count: i64, page_size: i64) -> i64 {
    if count <= 0 {
        0
    } else {
        (count - 1) / page_size + 1
    }
}

/// One page of results.
///
/// # JSON Example
///
/// ```json
/// {
///   "data": [],
///   "records": 0,
///   "page": 1,
///   "pageSize": 10,
///   "totalPages": 0
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub records: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Fetch one page of requests, most recently updated first.
///
/// # Errors
///
/// - `Store`: either the page fetch or the count failed; nothing partial is returned
pub async fn list_requests(
    store: &dyn DocumentStore,
    page: PageRequest,
) -> Result<Page<SongRequest>, AppError> {
    let started = Instant::now();

    let data = store.find_requests(page.skip(), page.page_size()).await?;
    tracing::debug!(elapsed = ?started.elapsed(), found = data.len(), "requests fetched");

    let records = store.count_requests().await?;
    tracing::debug!(elapsed = ?started.elapsed(), records, "requests counted");

    Ok(Page {
        data,
        records,
        page: page.page(),
        page_size: page.page_size(),
        total_pages: total_pages(records, page.page_size()),
    })
}

/// Submit a new request.
///
/// # Process
///
/// 1. Validate that `name` is present and not empty
/// 2. Default the audience
/// 3. Key the request by today's date in `key_offset`
/// 4. Insert and return the stored document
///
/// # Errors
///
/// - `InvalidRequest`: `name` is missing or empty
/// - `Store`: insertion failed
pub async fn create_request(
    store: &dyn DocumentStore,
    body: CreateSongRequest,
    key_offset: FixedOffset,
) -> Result<SongRequest, AppError> {
    if body.name.is_empty() {
        return Err(AppError::InvalidRequest("name is required".to_string()));
    }
    let audience = body.audience_or_default();

    let now = Utc::now();
    let new_request = NewSongRequest::new(
        body.name,
        audience,
        now.with_timezone(&key_offset).date_naive(),
        now,
    );

    let created = store.insert_request(new_request).await?;
    tracing::info!(id = %created.id, key = %created.key, "song request created");

    Ok(created)
}

/// Flip `done` on a request.
///
/// # Errors
///
/// - `NotFound`: no request has this id
/// - `Store`: the update failed
pub async fn toggle_request(store: &dyn DocumentStore, id: Uuid) -> Result<SongRequest, AppError> {
    let updated = store.toggle_request(id).await?.ok_or(AppError::NotFound)?;
    tracing::info!(%id, done = updated.done, "song request toggled");

    Ok(updated)
}

/// Remove a request.
///
/// # Errors
///
/// - `NotFound`: no request has this id
/// - `Store`: the delete failed
pub async fn delete_request(store: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    store.delete_request(id).await?.ok_or(AppError::NotFound)?;
    tracing::info!(%id, "song request deleted");

    Ok(())
}

/// Parse a path identity.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|err| AppError::InvalidRequest(format!("invalid id: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn page_request_applies_defaults_and_computes_skip() {
        let page = PageRequest::new(None, None).unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.skip(), 0);

        let page = PageRequest::new(Some(3), Some(25)).unwrap();
        assert_eq!(page.skip(), 50);
        assert_eq!(page.page_size(), 25);
    }

    #[test]
    fn page_request_rejects_non_positive_and_overflowing_values() {
        for (page, size) in [(Some(0), None), (None, Some(0)), (Some(-1), Some(5))] {
            assert!(matches!(
                PageRequest::new(page, size),
                Err(AppError::InvalidRequest(_))
            ));
        }
        assert!(PageRequest::new(Some(i64::MAX), Some(2)).is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(7, 3), 3);
    }

    #[tokio::test]
    async fn list_never_returns_more_than_page_size() {
        let store = MemoryStore::new();
        for n in 0..7 {
            let body = CreateSongRequest {
                name: format!("song {n}"),
                audience: None,
            };
            create_request(&store, body, FixedOffset::east_opt(0).unwrap())
                .await
                .unwrap();
        }

        let page = list_requests(&store, PageRequest::new(Some(2), Some(3)).unwrap())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.records, 7);
        assert_eq!(page.total_pages, 3);

        let last = list_requests(&store, PageRequest::new(Some(3), Some(3)).unwrap())
            .await
            .unwrap();
        assert_eq!(last.data.len(), 1);

        let beyond = list_requests(&store, PageRequest::new(Some(9), Some(3)).unwrap())
            .await
            .unwrap();
        assert!(beyond.data.is_empty());
    }

    #[tokio::test]
    async fn list_fails_whole_when_store_is_down() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = list_requests(&store, PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_insert() {
        let store = MemoryStore::new();
        let body = CreateSongRequest {
            name: String::new(),
            audience: Some("Alice".to_string()),
        };

        let err = create_request(&store, body, FixedOffset::east_opt(0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(store.count_requests().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn name_and_audience_are_stored_verbatim() {
        let store = MemoryStore::new();
        let body = CreateSongRequest {
            name: "  Padded Song  ".to_string(),
            audience: Some(" Bob ".to_string()),
        };

        let created = create_request(&store, body, FixedOffset::east_opt(0).unwrap())
            .await
            .unwrap();
        assert_eq!(created.name, "  Padded Song  ");
        assert_eq!(created.audience, " Bob ");

        let body = CreateSongRequest {
            name: "   ".to_string(),
            audience: None,
        };
        let created = create_request(&store, body, FixedOffset::east_opt(0).unwrap())
            .await
            .unwrap();
        assert_eq!(created.name, "   ");
        assert_eq!(store.count_requests().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn key_uses_configured_offset() {
        let store = MemoryStore::new();
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let body = CreateSongRequest {
            name: "Test Song".to_string(),
            audience: None,
        };

        let created = create_request(&store, body, offset).await.unwrap();
        let expected = created
            .created_at
            .with_timezone(&offset)
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(created.key, expected);
    }

    #[tokio::test]
    async fn double_toggle_restores_done_and_advances_updated_at() {
        let store = MemoryStore::new();
        let body = CreateSongRequest {
            name: "Song".to_string(),
            audience: None,
        };
        let created = create_request(&store, body, FixedOffset::east_opt(0).unwrap())
            .await
            .unwrap();

        let once = toggle_request(&store, created.id).await.unwrap();
        let twice = toggle_request(&store, created.id).await.unwrap();

        assert!(once.done);
        assert_eq!(twice.done, created.done);
        assert!(once.updated_at > created.updated_at);
        assert!(twice.updated_at > once.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            toggle_request(&store, id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            delete_request(&store, id).await,
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn parse_id_rejects_malformed_input() {
        assert!(parse_id("not-an-id").is_err());
        assert!(parse_id(&Uuid::nil().to_string()).is_ok());
    }
}
