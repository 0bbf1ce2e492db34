//! # Domain Module
//!
//! Business logic of the finance tracker, independent of how records are
//! stored. Services talk to storage only through the traits in
//! `crate::backend::storage::traits`.
//!
//! ## Services
//!
//! - **TransactionService**: add, edit, delete, query, export, import and backups
//! - **BalanceService**: balance, category and summary calculations
//! - **ExportService**: export envelopes, import parsing and the import report
//!
//! Input checking lives in `validator`; typed inputs in `commands`.

pub mod balance_service;
pub mod commands;
pub mod export_service;
pub mod models;
pub mod transaction_service;
pub mod validator;

pub use balance_service::BalanceService;
pub use commands::transactions::TransactionCommand;
pub use export_service::{ExportEnvelope, ExportService, ImportError, ImportReport, ImportSource};
pub use models::{Transaction, TransactionId};
pub use transaction_service::{TransactionError, TransactionService};
pub use validator::{AmountError, ValidationError, ValidationErrors};
