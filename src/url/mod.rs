//! URL handling module for url-evaluator
//!
//! This module provides absolute-URL validation and resolution of link
//! targets against the page they were found on.

mod resolve;
mod validate;

// Re-export main functions
pub use resolve::resolve_link;
pub use validate::{is_valid_url, validate_seed_url};
