//! Command Center Proxy Library
//!
//! Thin HTTP endpoints that trigger, list and inspect Vercel deployments on
//! behalf of the AI Command Center dashboard.

pub mod app;
pub mod errors;
pub mod http;
pub mod logs;
pub mod server;
pub mod utils;
