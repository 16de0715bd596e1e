//! Application configuration and lifecycle

pub mod options;
pub mod run;
pub mod settings;
