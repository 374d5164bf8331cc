//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Member reads and writes go through `diesel-async` with `bb8` connection
//! pooling. Row structs (`models.rs`) and the table definition (`schema.rs`)
//! never leave this module; adapters translate them into domain members and
//! map every database failure onto the port error types.
//!
//! # Example
//!
//! ```ignore
//! use alumni_directory::outbound::persistence::{DbPool, DieselMemberDirectory, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/alumni")).await?;
//! let directory = DieselMemberDirectory::new(pool);
//! ```

mod diesel_helpers;
mod diesel_member_directory;
mod diesel_member_repository;
mod models;
mod pool;
mod schema;

pub use diesel_member_directory::DieselMemberDirectory;
pub use diesel_member_repository::DieselMemberRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
