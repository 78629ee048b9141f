//! Account infrastructure module
//!
//! This module provides implementations for account management, including
//! PBKDF2 password hashing, in-memory and PostgreSQL repositories, and the
//! account service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Pbkdf2Hasher, HASH_LENGTH, ITERATIONS, SALT_LENGTH};
pub use postgres_repository::PostgresAccountRepository;
pub use repository::InMemoryAccountRepository;
pub use service::{AccountService, RegisterRequest, UpdateAccountRequest};
