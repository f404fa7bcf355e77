//! Intake status service.
//!
//! The intake switch is the `accepting` configuration document. It has two
//! states, accepting and paused, and only changes through [`toggle_status`].

use crate::{
    error::AppError,
    models::configuration::{ACCEPTING, Configuration},
    store::{DocumentStore, StoreError},
};

/// Fetch the intake switch.
///
/// # Errors
///
/// - `NotFound`: the document has not been seeded
/// - `Store`: the lookup failed
pub async fn find_status(store: &dyn DocumentStore) -> Result<Configuration, AppError> {
    store.find_config(ACCEPTING).await?.ok_or(AppError::NotFound)
}

/// Flip the intake switch and return its new state.
///
/// # Errors
///
/// - `NotFound`: the document has not been seeded
/// - `Store`: the update failed or the stored value is not a bool
pub async fn toggle_status(store: &dyn DocumentStore) -> Result<Configuration, AppError> {
    let updated = store.toggle_config(ACCEPTING).await?.ok_or(AppError::NotFound)?;
    tracing::info!(value = ?updated.value, "intake status toggled");

    Ok(updated)
}

/// Whether new requests may be submitted.
///
/// # Errors
///
/// - `MissingConfig`: the document has not been seeded
/// - `Store`: the lookup failed, or the value is not a bool
pub async fn is_accepting(store: &dyn DocumentStore) -> Result<bool, AppError> {
    let config = store
        .find_config(ACCEPTING)
        .await?
        .ok_or_else(|| AppError::MissingConfig(ACCEPTING.to_string()))?;

    config.value.as_bool().ok_or_else(|| {
        AppError::Store(StoreError::NotBoolean {
            name: config.name.clone(),
            kind: config.value.kind(),
        })
    })
}
