//! quarantine-core
//!
//! This crate provides the core functionality behind quarantine-cli:
//! - Quarantine records and the `com.apple.quarantine` attribute codec
//! - The store seam over OS-owned file metadata
//! - Access to the LaunchServices quarantine events database
//! - The manager implementing set, clear and query
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     quarantine-core                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  manager.rs    - Set / clear / query, path validation       │
//! │  store/        - QuarantineStore trait, xattr + memory      │
//! │  storage/      - Quarantine events database (SQLite)        │
//! │  types/        - Records, attribute codec, event rows       │
//! │  config.rs     - config.json handling                       │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod storage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{Config, DEFAULT_AGENT_NAME};
pub use error::{Error, Result, StorageError};
pub use manager::{file_url, QuarantineManager, QueryOutcome, SetOptions};
pub use storage::EventsDatabase;
pub use store::{MemoryStore, QuarantineStore, XattrStore};
pub use types::*;
