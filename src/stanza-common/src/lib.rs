//! Common utilities shared across Stanza crates.

pub mod tokens;
pub mod truncate;

pub use tokens::{APPROX_CHARS_PER_TOKEN, chars_for_tokens, estimate_tokens};
pub use truncate::{truncate_to_tokens, truncate_with_ellipsis};
