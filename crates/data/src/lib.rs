//! Persistence for simulation runs.
//!
//! This crate provides:
//! - A key/value storage seam with file and in-memory implementations
//! - The newest-first history log with filtering and best-run selection
//! - CSV export of history views

/// Error types.
pub mod error;
/// Tabular export.
pub mod export;
/// History log.
pub mod history;
/// Key/value storage backends.
pub mod storage;

pub use error::{ExportError, HistoryError, StorageError};
pub use export::{EXPORT_COLUMNS, ExportRow, export_csv, export_rows, write_csv};
pub use history::{HISTORY_KEY, HistoryFilter, HistoryStore};
pub use storage::{HistoryConfig, JsonFileStorage, KeyValueStorage, MemoryStorage};
