//! HTTP layer: router, handlers, envelope response format, error mapping.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
