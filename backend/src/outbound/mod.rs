//! Adapters implementing the member ports.
//!
//! - **memory**: process-local stores backing the fixture directory and tests
//! - **persistence**: PostgreSQL member table reached through Diesel
//!
//! Adapters only translate between domain members and their storage form;
//! listing rules live in the domain.

pub mod memory;
pub mod persistence;
