//! # JSON Storage Module
//!
//! File-based storage for transactions: a single pretty-printed JSON array,
//! reloaded on every read and rewritten on every mutation.
//!
//! ## File Format
//!
//! ```json
//! [
//!   {
//!     "amount": -250.0,
//!     "category": "Food",
//!     "date": "2024-01-15",
//!     "description": "Groceries",
//!     "id": "5f0c1b9e-2f4e-4c1a-9d51-7f3a2c8e4b10"
//!   }
//! ]
//! ```
//!
//! Files written before identifiers existed (no `id` key) are accepted and
//! upgraded in place on first read.

pub mod connection;
pub mod transaction_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::{write_json_atomic, JsonConnection};
pub use transaction_repository::TransactionRepository;
