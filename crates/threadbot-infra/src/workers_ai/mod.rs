//! Cloudflare Workers AI inference client.

pub mod client;
pub mod types;

pub use client::WorkersAiClient;
