//! # roster-db
//!
//! Database layer implementing the repository traits with PostgreSQL via SQLx.
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ model mappers
//! - Repository implementations
//! - Embedded SQL migrations (`run_migrations`)

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgBindingRepository, PgExternalSponsorRepository, PgGuildConfigRepository,
    PgSponsorRepository,
};
