//! Process-local adapters for the member ports.
//!
//! Used by the behavioural suites and by deployments that seed a directory
//! from fixtures instead of PostgreSQL. They honour the same ordering and
//! windowing contract as the Diesel adapters.

mod member_store;
mod object_stores;

pub use member_store::InMemoryMemberStore;
pub use object_stores::{InMemoryAvatarStorage, InMemoryIdentityDirectory};
