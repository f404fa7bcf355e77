//! Song Request Queue - REST service for collecting and working through song requests.
//!
//! Clients submit song requests, an operator toggles them done and can pause
//! intake globally. Every `/api` route is protected by a static API key.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: [`store::DocumentStore`] with PostgreSQL (sqlx) and in-memory backends
//! - **Authentication**: `x-api-key` header, exact match against stored keys
//! - **Format**: JSON requests/responses
//!
//! # Request Flow
//!
//! access gate → intake gate (creation only) → service → store

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE},
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use chrono::FixedOffset;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{GateChain, auth::AccessGate, intake::IntakeGate},
    store::DocumentStore,
};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,

    /// Time zone in which the `key` of new requests is computed.
    pub key_offset: FixedOffset,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, key_offset: FixedOffset) -> Self {
        Self { store, key_offset }
    }
}

/// Build the HTTP application.
///
/// # Routes
///
/// Public:
/// - `GET /` and `GET /health`
///
/// Behind the access gate:
/// - `GET /api/requests`, `PATCH|DELETE /api/requests/{id}`
/// - `GET|PATCH /api/status`
///
/// Behind the access gate and then the intake gate:
/// - `POST /api/requests`
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    let protected = GateChain::new().then(AccessGate::new(state.store.clone()));
    let submission = protected
        .clone()
        .then(IntakeGate::new(state.store.clone()));

    let api = Router::new()
        .route(
            "/requests",
            get(handlers::requests::list_requests)
                .route_layer(axum_middleware::from_fn_with_state(
                    protected.clone(),
                    middleware::enforce,
                ))
                .merge(post(handlers::requests::create_request).route_layer(
                    axum_middleware::from_fn_with_state(submission, middleware::enforce),
                )),
        )
        .route(
            "/requests/{id}",
            patch(handlers::requests::toggle_request)
                .delete(handlers::requests::delete_request)
                .route_layer(axum_middleware::from_fn_with_state(
                    protected.clone(),
                    middleware::enforce,
                )),
        )
        .route(
            "/status",
            get(handlers::status::find_status)
                .patch(handlers::status::toggle_status)
                .route_layer(axum_middleware::from_fn_with_state(
                    protected,
                    middleware::enforce,
                )),
        );

    Router::new()
        // Public routes (no authentication required)
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy allowing the configured origins to send `x-api-key`.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::auth::API_KEY_HEADER),
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
