//! Networking modules for the auth REST endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` applies endpoint results to the session, `transport` abstracts the
//! HTTP round trip so tests can script responses, and `types` defines the
//! wire schema.

pub mod api;
pub mod transport;
pub mod types;
