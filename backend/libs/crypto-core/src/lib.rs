//! Shared cryptographic helpers for Yatube services.
//!
//! - `jwt`: RS256 token issuing and validation
pub mod jwt;
