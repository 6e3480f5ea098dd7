//! Domain primitives shared by the database and API crates.
//!
//! Nothing in here performs I/O.

pub mod accounts;
pub mod error;
pub mod hashing;
pub mod roles;
pub mod types;
