//! # Storage Module
//!
//! Handles all data persistence for the finance tracker.
//!
//! The domain layer only sees the `TransactionStorage` and `Connection`
//! traits; `json` is the flat-file implementation used by the application.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: Saving the transaction collection to disk
//! - **Self-Healing Reads**: A missing or corrupted file reads as an empty collection
//! - **Atomic Writes**: Every rewrite goes through a temporary file and a rename

pub mod error;
pub mod json;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use json::{write_json_atomic, JsonConnection, TransactionRepository};
pub use traits::{Connection, TransactionStorage};
