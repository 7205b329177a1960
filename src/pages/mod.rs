//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page installs the route guard for its own access rule and renders
//! only once the guard would admit the current session.

pub mod admin;
pub mod dashboard;
pub mod login;
