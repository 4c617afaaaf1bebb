//! Persistence backends for triageflow.
//!
//! - [`InMemoryStore`] - An [`AllocationStore`](triageflow_core::AllocationStore)
//!   with all-or-nothing commits
//! - [`ingest`] - CSV loading for every domain entity
//! - [`load_dataset`] - A whole store from a directory of CSV files

mod dataset;
pub mod ingest;
mod memory;

#[cfg(test)]
mod memory_tests;

pub use dataset::{load_dataset, DatasetSummary, FileDiagnostics};
pub use ingest::{load_csv, read_csv, CsvEntity, IngestError, IngestReport, RowDiagnostic};
pub use memory::InMemoryStore;
