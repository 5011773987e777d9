//! HTTP request handlers, one module per resource.

pub mod model;
pub mod thread;
