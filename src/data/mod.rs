//! Persistence boundary: historical-row providers.

pub mod store;

pub use store::{CsvStore, HistoryProvider, MemoryStore};
