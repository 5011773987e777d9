//! Shared domain types for threadbot.
//!
//! This crate contains the core domain types used across the workspace:
//! conversation sessions, messages, model identifiers, platform events,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod session;
