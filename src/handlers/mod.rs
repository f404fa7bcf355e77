//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to a service
//! 3. Returns HTTP response (JSON, status code)

/// Public liveness endpoints
pub mod health;
/// Song request endpoints
pub mod requests;
/// Intake status endpoints
pub mod status;
