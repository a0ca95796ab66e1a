#![forbid(unsafe_code)]

//! Core domain model and data access for the exlog exercise tracker.
//!
//! This crate provides:
//! - Domain types (users, exercises, log views)
//! - Calendar date parsing and rendering
//! - Log filtering
//! - Record stores (in-memory, JSONL journal + snapshot)
//! - The data access service used by the HTTP layer
//! - Configuration, logging and CSV export

pub mod types;
pub mod error;
pub mod dates;
pub mod log_filter;
pub mod config;
pub mod logging;
pub mod journal;
pub mod snapshot;
pub mod store;
pub mod jsonl_store;
pub mod service;
pub mod export;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use types::*;
pub use config::{Config, StoreBackend};
pub use log_filter::{filter_log, LogFilter};
pub use store::{MemoryStore, UserStore};
pub use jsonl_store::JsonlStore;
pub use service::ExerciseService;
