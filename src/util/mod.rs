//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser concerns (storage, clock) and the pure
//! token and guard rules from page logic to improve reuse and testability.

pub mod auth;
pub mod storage;
pub mod token;
