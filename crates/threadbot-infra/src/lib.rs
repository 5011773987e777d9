//! Infrastructure implementations for threadbot.
//!
//! Implements the ports defined in `threadbot-core`: a SQLite-backed
//! session store and a Cloudflare Workers AI inference client, plus the
//! process configuration loader.

pub mod config;
pub mod sqlite;
pub mod workers_ai;
