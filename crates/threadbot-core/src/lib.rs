//! Session routing logic and port traits for threadbot.
//!
//! This crate defines the "ports" (`SessionStore`, `InferenceClient`) that
//! the infrastructure layer implements, plus the `SessionRouter` state
//! machine that drives them. It depends only on `threadbot-types` -- never
//! on `threadbot-infra` or any database/IO crate.

pub mod catalog;
pub mod inference;
pub mod regenerate;
pub mod router;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
