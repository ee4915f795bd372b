//! Core journal logic - framework-agnostic storage, store and metrics.

/// Derived statistics: elapsed days, EC alerts, chart series, reports
pub mod metrics;
/// Key-value access to the storage table
pub mod storage;
/// The persistent journal store
pub mod store;

pub use store::JournalStore;
