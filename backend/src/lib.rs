//! Core of the finance tracker: a JSON-file transaction store with validation,
//! balance and search queries, export/import and backups.

pub mod backend;

pub use backend::{AppConfig, Backend};
