//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **credentials**: argon2 password hashing and PASETO identity tokens
//! - **persistence**: PostgreSQL and in-memory user repositories
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod credentials;
pub mod persistence;
