//! Song request HTTP handlers.
//!
//! This module implements the request queue endpoints:
//! - GET /api/requests - Paginated list, most recently updated first
//! - POST /api/requests - Submit a song (only while intake is open)
//! - PATCH /api/requests/{id} - Toggle `done`
//! - DELETE /api/requests/{id} - Remove a request

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    models::song_request::{CreateSongRequest, SongRequest},
    services::request_service::{self, Page, PageRequest},
};

/// Query string of the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,

    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// List requests.
///
/// # Endpoint
///
/// `GET /api/requests?page=1&pageSize=10`
///
/// # Response
///
/// - **Success (200 OK)**: page envelope, `data` is always an array
/// - **Error (400)**: `page` or `pageSize` not a positive integer
/// - **Error (500)**: store failure
///
/// ```json
/// {
///   "data": [{ "_id": "550e8400-...", "name": "Test Song", "done": false }],
///   "records": 1,
///   "page": 1,
///   "pageSize": 10,
///   "totalPages": 1
/// }
/// ```
pub async fn list_requests(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<SongRequest>>, AppError> {
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(%rejection, "unparseable list query");
        request_service::bad_query_params()
    })?;
    let page = PageRequest::new(params.page, params.page_size)?;

    let page = request_service::list_requests(state.store.as_ref(), page).await?;

    Ok(Json(page))
}

/// Submit a song request.
///
/// # Endpoint
///
/// `POST /api/requests`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Test Song",
///   "audience": "Alice"  // optional
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: the stored request with its `_id`
/// - **Error (400)**: malformed body, missing name, or intake paused
/// - **Error (500)**: store failure
pub async fn create_request(
    State(state): State<AppState>,
    body: Result<Json<CreateSongRequest>, JsonRejection>,
) -> Result<Json<SongRequest>, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    let created =
        request_service::create_request(state.store.as_ref(), body, state.key_offset).await?;

    Ok(Json(created))
}

/// Toggle a request's `done` flag.
///
/// # URL Parameters
///
/// - `id` - UUID of the request
///
/// # Response
///
/// - **Success (200 OK)**: the request after the toggle
/// - **Error (400)**: malformed id
/// - **Error (404)**: no such request
pub async fn toggle_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongRequest>, AppError> {
    let id = request_service::parse_id(&id)?;

    let updated = request_service::toggle_request(state.store.as_ref(), id).await?;

    Ok(Json(updated))
}

/// Delete a request.
///
/// # Response
///
/// - **Success (200 OK)**: empty body
/// - **Error (400)**: malformed id
/// - **Error (404)**: no such request
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = request_service::parse_id(&id)?;

    request_service::delete_request(state.store.as_ref(), id).await?;

    Ok(StatusCode::OK)
}
