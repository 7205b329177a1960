//! Shared client-side auth state.
//!
//! DESIGN
//! ======
//! `token_store` is the persistence boundary, `session` is the single
//! mutable owner of auth state, and `auth` is the read-only snapshot pages
//! render from.

pub mod auth;
pub mod session;
pub mod token_store;
