//! Business logic services.
//!
//! Services contain the core logic separated from HTTP handlers.
//! They validate input, call the store and map its outcomes onto `AppError`.

pub mod request_service;
pub mod status_service;
