//! Data models representing stored entities.
//!
//! This module contains all data structures that map to database tables.

/// API key authentication model
pub mod api_key;
/// Named configuration documents (intake switch)
pub mod configuration;
/// Song request model
pub mod song_request;
