//! Wire models
//!
//! Payloads exchanged with the Vercel deployments API and the response
//! bodies returned by the command center proxy.

pub mod models;

pub use models::*;
