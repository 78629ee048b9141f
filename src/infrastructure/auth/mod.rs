//! Authentication infrastructure module
//!
//! This module provides JWT token issuance for account authentication.

mod jwt;

pub use jwt::{JwtConfig, JwtService, DEFAULT_EXPIRATION_DAYS};
