//! Per-user download history: SQLite storage and the interactive browser.

pub mod storage;
pub mod ui;

pub use storage::{DownloadRecord, DownloadStore, HistoryStore, NewDownloadRecord};
pub use ui::{HistoryAction, HistoryViewer};
