//! Intake gate.
//!
//! Applied to request creation only. Listing, toggling and deleting keep
//! working while intake is paused.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::Gate;
use crate::{error::AppError, services::status_service, store::DocumentStore};

/// Admits requests only while the `accepting` switch is on.
pub struct IntakeGate {
    store: Arc<dyn DocumentStore>,
}

impl IntakeGate {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Gate for IntakeGate {
    fn name(&self) -> &'static str {
        "intake"
    }

    async fn check(&self, _headers: &HeaderMap) -> Result<(), AppError> {
        if status_service::is_accepting(self.store.as_ref()).await? {
            Ok(())
        } else {
            tracing::info!("blocked request creation, intake is paused");
            Err(AppError::NotAccepting)
        }
    }
}
