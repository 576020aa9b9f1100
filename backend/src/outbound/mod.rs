//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: mutex-guarded in-process repositories
//! - **notify**: swap notification delivery
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod memory;
pub mod notify;
pub mod persistence;
