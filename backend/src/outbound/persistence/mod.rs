//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types; every business rule lives in the domain services. Row structs and
//! the schema stay private to this module. Connections come from a `bb8`
//! pool of `diesel-async` connections, and every database failure is mapped
//! into the owning port's error type.
//!
//! # Example
//!
//! ```ignore
//! use skillswap::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::connect(&PoolConfig::new("postgres://localhost/skillswap")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_admin_message_repository;
mod diesel_skill_repository;
mod diesel_swap_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_admin_message_repository::DieselAdminMessageRepository;
pub use diesel_skill_repository::DieselSkillRepository;
pub use diesel_swap_repository::DieselSwapRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
