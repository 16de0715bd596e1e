//! API models

pub mod deployments;
pub mod errors;
pub mod events;

pub use deployments::*;
pub use errors::*;
pub use events::*;

/// Maximum number of characters of an upstream error body relayed to clients
pub const MAX_DETAIL_CHARS: usize = 300;

/// Truncate an upstream error body to at most [`MAX_DETAIL_CHARS`] characters
pub fn truncate_detail(body: &str) -> String {
    body.chars().take(MAX_DETAIL_CHARS).collect()
}
