//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern:
//!
//! - **persistence**: MongoDB-backed repositories for users and sessions
//! - **security**: bcrypt password hashing and JWT bearer tokens
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
pub mod security;
