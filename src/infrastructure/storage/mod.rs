//! Storage infrastructure - PostgreSQL connection and schema

pub mod migrations;
mod postgres;

pub use migrations::{
    account_migrations, revert_last_account_migration, run_account_migrations, Migration,
    PostgresMigrator,
};
pub use postgres::connect;
