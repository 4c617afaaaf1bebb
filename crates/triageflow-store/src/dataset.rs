//! Loading a whole [`InMemoryStore`] from a directory of CSV files.

use std::path::Path;

use tracing::info;
use triageflow_core::{
    DisasterZone, Hospital, HospitalTransfer, Item, Patient, RouteLink, SupplyCenter,
    TransportRoute,
};

use crate::ingest::{load_csv, CsvEntity, IngestError, RowDiagnostic};
use crate::memory::InMemoryStore;

/// Rows skipped while loading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostics {
    pub file: &'static str,
    pub skipped: Vec<RowDiagnostic>,
}

/// What a directory load found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Files that were present, in load order.
    pub files: Vec<&'static str>,
    pub rows: usize,
    pub diagnostics: Vec<FileDiagnostics>,
}

impl DatasetSummary {
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().map(|d| d.skipped.len()).sum()
    }
}

fn load_optional<E: CsvEntity>(
    dir: &Path,
    file: &'static str,
    summary: &mut DatasetSummary,
) -> Result<Vec<E>, IngestError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let report = load_csv::<E>(&path)?;
    summary.files.push(file);
    summary.rows += report.rows.len();
    if !report.skipped.is_empty() {
        summary.diagnostics.push(FileDiagnostics {
            file,
            skipped: report.skipped,
        });
    }
    Ok(report.rows)
}

/// Loads every known file present in `dir`; missing files load as empty.
///
/// | file            | entity             |
/// |-----------------|--------------------|
/// | `patients.csv`  | [`Patient`]        |
/// | `hospitals.csv` | [`Hospital`]       |
/// | `transfers.csv` | [`HospitalTransfer`] |
/// | `centers.csv`   | [`SupplyCenter`]   |
/// | `zones.csv`     | [`DisasterZone`]   |
/// | `routes.csv`    | [`TransportRoute`] |
/// | `links.csv`     | [`RouteLink`]      |
/// | `items.csv`     | [`Item`]           |
pub fn load_dataset(dir: impl AsRef<Path>) -> Result<(InMemoryStore, DatasetSummary), IngestError> {
    let dir = dir.as_ref();
    let mut summary = DatasetSummary::default();

    let store = InMemoryStore::new()
        .with_patients(load_optional::<Patient>(dir, "patients.csv", &mut summary)?)
        .with_hospitals(load_optional::<Hospital>(dir, "hospitals.csv", &mut summary)?)
        .with_transfers(load_optional::<HospitalTransfer>(dir, "transfers.csv", &mut summary)?)
        .with_centers(load_optional::<SupplyCenter>(dir, "centers.csv", &mut summary)?)
        .with_zones(load_optional::<DisasterZone>(dir, "zones.csv", &mut summary)?)
        .with_routes(load_optional::<TransportRoute>(dir, "routes.csv", &mut summary)?)
        .with_links(load_optional::<RouteLink>(dir, "links.csv", &mut summary)?)
        .with_items(load_optional::<Item>(dir, "items.csv", &mut summary)?);

    info!(
        event = "dataset_loaded",
        files = summary.files.len(),
        rows = summary.rows,
        skipped = summary.skipped(),
    );
    Ok((store, summary))
}
