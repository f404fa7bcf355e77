//! HTTP middleware components.
//!
//! Cross-cutting checks are modelled as [`Gate`]s. A [`GateChain`] runs its
//! gates in the order they were added; the first gate that rejects ends the
//! request with its error, and the handler only runs once every gate passed.
//!
//! Chains are attached to routes with [`enforce`]:
//!
//! ```ignore
//! let chain = GateChain::new().then(AccessGate::new(store.clone()));
//! router.route_layer(axum::middleware::from_fn_with_state(chain, enforce));
//! ```

/// API key authentication gate
pub mod auth;
/// Intake (accepting flag) gate
pub mod intake;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

/// A check that either admits a request or rejects it with an error.
#[async_trait]
pub trait Gate: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    async fn check(&self, headers: &HeaderMap) -> Result<(), AppError>;
}

/// Ordered list of gates.
#[derive(Clone, Default)]
pub struct GateChain {
    gates: Vec<Arc<dyn Gate>>,
}

impl GateChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a gate; it runs after every gate already in the chain.
    pub fn then(mut self, gate: impl Gate + 'static) -> Self {
        self.gates.push(Arc::new(gate));
        self
    }

    /// Run every gate in order, stopping at the first rejection.
    pub async fn admit(&self, headers: &HeaderMap) -> Result<(), AppError> {
        for gate in &self.gates {
            if let Err(err) = gate.check(headers).await {
                tracing::debug!(gate = gate.name(), "gate rejected request");
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|gate| gate.name()).collect()
    }
}

/// Middleware running a [`GateChain`] before the wrapped handler.
pub async fn enforce(
    State(chain): State<GateChain>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    chain.admit(request.headers()).await?;

    Ok(next.run(request).await)
}
