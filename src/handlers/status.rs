//! Intake status handlers.
//!
//! - GET /api/status - Current value of the `accepting` switch
//! - PATCH /api/status - Flip the switch

use axum::{Json, extract::State};

use crate::{
    AppState, error::AppError, models::configuration::Configuration,
    services::status_service,
};

/// Read the intake switch.
///
/// # Response (200 OK)
///
/// ```json
/// { "name": "accepting", "value": true }
/// ```
pub async fn find_status(State(state): State<AppState>) -> Result<Json<Configuration>, AppError> {
    let status = status_service::find_status(state.store.as_ref()).await?;

    Ok(Json(status))
}

/// Flip the intake switch and return its new value.
pub async fn toggle_status(
    State(state): State<AppState>,
) -> Result<Json<Configuration>, AppError> {
    let status = status_service::toggle_status(state.store.as_ref()).await?;

    Ok(Json(status))
}
