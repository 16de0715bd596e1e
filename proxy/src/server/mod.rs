//! Local HTTP server

pub mod build_logs;
pub mod deploy;
pub mod handlers;
pub mod serve;
pub mod state;
pub mod status;
