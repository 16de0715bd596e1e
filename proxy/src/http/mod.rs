//! Upstream HTTP access

pub mod client;
pub mod deployments;
pub mod transport;
