//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories built on Diesel
//! - **security**: bcrypt password hashing and JWT signing
//! - **memory**: in-process store used by tests (`test-support` feature)
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod persistence;
pub mod security;
