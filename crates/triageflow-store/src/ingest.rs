//! CSV ingestion of domain entities.
//!
//! Headers are matched case-insensitively, so `Source,Dest,Cap` and
//! `source,dest,capacity` load the same route network. Rows that do not
//! parse, hold impossible values or repeat an earlier id are skipped and
//! reported; I/O and framing errors abort the load.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use triageflow_core::{
    Band, BandBeds, DisasterZone, Hospital, HospitalTransfer, Item, Patient, RouteLink,
    SupplyCenter, TransportRoute,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{kind} file is missing a `{column}` column")]
    MissingColumn {
        kind: &'static str,
        column: &'static str,
    },
}

/// A row that was skipped, with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    pub line: u64,
    pub reason: String,
}

/// Accepted rows plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport<T> {
    pub rows: Vec<T>,
    pub skipped: Vec<RowDiagnostic>,
}

impl<T> Default for IngestReport<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> IngestReport<T> {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A domain entity that can be loaded from one CSV row.
pub trait CsvEntity: Sized {
    type Row: DeserializeOwned;

    /// Used in diagnostics and log events.
    const KIND: &'static str;

    /// Required columns; each entry lists accepted spellings, lowercase.
    const COLUMNS: &'static [&'static [&'static str]];

    /// Validates a parsed row. `index` is the number of rows accepted so far.
    fn from_row(row: Self::Row, index: usize) -> Result<Self, String>;

    /// Primary key; a later row repeating an accepted id is skipped.
    fn primary_id(&self) -> Option<u64> {
        None
    }
}

fn non_negative(field: &str, value: i64) -> Result<i64, String> {
    if value < 0 {
        return Err(format!("{field} must not be negative, got {value}"));
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
pub struct RouteLinkRow {
    #[serde(alias = "from")]
    source: String,
    #[serde(alias = "to", alias = "destination")]
    dest: String,
    #[serde(alias = "cap", alias = "max_capacity")]
    capacity: i64,
}

impl CsvEntity for RouteLink {
    type Row = RouteLinkRow;
    const KIND: &'static str = "route link";
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["source", "from"],
        &["dest", "to", "destination"],
        &["capacity", "cap", "max_capacity"],
    ];

    fn from_row(row: RouteLinkRow, index: usize) -> Result<Self, String> {
        if row.source.is_empty() || row.dest.is_empty() {
            return Err("link endpoints must not be empty".to_string());
        }
        Ok(RouteLink {
            id: index as u64 + 1,
            from: row.source,
            to: row.dest,
            max_capacity: non_negative("capacity", row.capacity)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemRow {
    id: u64,
    #[serde(default)]
    name: String,
    weight: i64,
    value: i64,
    #[serde(default)]
    quantity: Option<i64>,
}

impl CsvEntity for Item {
    type Row = ItemRow;
    const KIND: &'static str = "item";
    const COLUMNS: &'static [&'static [&'static str]] = &[&["id"], &["weight"], &["value"]];

    fn from_row(row: ItemRow, _index: usize) -> Result<Self, String> {
        let name = if row.name.is_empty() {
            format!("item-{}", row.id)
        } else {
            row.name
        };
        Ok(Item::new(
            row.id,
            name,
            non_negative("weight", row.weight)?,
            non_negative("value", row.value)?,
            non_negative("quantity", row.quantity.unwrap_or(1))?,
        ))
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct HospitalRow {
    id: u64,
    name: String,
    critical: i64,
    top: i64,
    mid: i64,
    low: i64,
}

impl CsvEntity for Hospital {
    type Row = HospitalRow;
    const KIND: &'static str = "hospital";
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["id"],
        &["name"],
        &["critical"],
        &["top"],
        &["mid"],
        &["low"],
    ];

    fn from_row(row: HospitalRow, _index: usize) -> Result<Self, String> {
        let beds = BandBeds::new(
            non_negative("critical", row.critical)?,
            non_negative("top", row.top)?,
            non_negative("mid", row.mid)?,
            non_negative("low", row.low)?,
        );
        Ok(Hospital::new(row.id, row.name, beds))
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct PatientRow {
    id: u64,
    name: String,
    #[serde(alias = "priority_level")]
    priority: i64,
    #[serde(default)]
    hospital_id: Option<u64>,
}

impl CsvEntity for Patient {
    type Row = PatientRow;
    const KIND: &'static str = "patient";
    const COLUMNS: &'static [&'static [&'static str]] =
        &[&["id"], &["name"], &["priority", "priority_level"]];

    fn from_row(row: PatientRow, _index: usize) -> Result<Self, String> {
        Band::from_priority(row.priority).map_err(|e| e.to_string())?;
        let mut patient = Patient::new(row.id, row.name, row.priority);
        patient.hospital_id = row.hospital_id;
        Ok(patient)
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRow {
    id: u64,
    #[serde(alias = "from")]
    from_hospital: u64,
    #[serde(alias = "to")]
    to_hospital: u64,
    capacity: i64,
}

impl CsvEntity for HospitalTransfer {
    type Row = TransferRow;
    const KIND: &'static str = "transfer";
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["id"],
        &["from_hospital", "from"],
        &["to_hospital", "to"],
        &["capacity"],
    ];

    fn from_row(row: TransferRow, _index: usize) -> Result<Self, String> {
        Ok(HospitalTransfer {
            id: row.id,
            from_hospital: row.from_hospital,
            to_hospital: row.to_hospital,
            capacity: non_negative("capacity", row.capacity)?,
        })
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct CenterRow {
    id: u64,
    name: String,
    #[serde(alias = "stock")]
    total_stock: i64,
}

impl CsvEntity for SupplyCenter {
    type Row = CenterRow;
    const KIND: &'static str = "supply center";
    const COLUMNS: &'static [&'static [&'static str]] =
        &[&["id"], &["name"], &["total_stock", "stock"]];

    fn from_row(row: CenterRow, _index: usize) -> Result<Self, String> {
        Ok(SupplyCenter {
            id: row.id,
            name: row.name,
            total_stock: non_negative("stock", row.total_stock)?,
        })
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ZoneRow {
    id: u64,
    name: String,
    demand: i64,
}

impl CsvEntity for DisasterZone {
    type Row = ZoneRow;
    const KIND: &'static str = "zone";
    const COLUMNS: &'static [&'static [&'static str]] = &[&["id"], &["name"], &["demand"]];

    fn from_row(row: ZoneRow, _index: usize) -> Result<Self, String> {
        Ok(DisasterZone {
            id: row.id,
            name: row.name,
            demand: non_negative("demand", row.demand)?,
        })
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRow {
    id: u64,
    #[serde(alias = "center")]
    center_id: u64,
    #[serde(alias = "zone")]
    zone_id: u64,
    send_limit: i64,
    #[serde(default)]
    amount_sent: Option<i64>,
}

impl CsvEntity for TransportRoute {
    type Row = RouteRow;
    const KIND: &'static str = "route";
    const COLUMNS: &'static [&'static [&'static str]] = &[
        &["id"],
        &["center_id", "center"],
        &["zone_id", "zone"],
        &["send_limit"],
    ];

    fn from_row(row: RouteRow, _index: usize) -> Result<Self, String> {
        let amount_sent = match row.amount_sent {
            Some(sent) => Some(non_negative("amount sent", sent)?),
            None => None,
        };
        Ok(TransportRoute {
            id: row.id,
            center_id: row.center_id,
            zone_id: row.zone_id,
            send_limit: non_negative("send limit", row.send_limit)?,
            amount_sent,
        })
    }

    fn primary_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

/// Reads entities of type `E` from CSV data with a header row.
pub fn read_csv<E: CsvEntity, R: Read>(input: R) -> Result<IngestReport<E>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut report = IngestReport::default();
    let mut seen = BTreeSet::new();
    if headers.is_empty() {
        return Ok(report);
    }
    for alternatives in E::COLUMNS {
        if !alternatives.iter().any(|a| headers.iter().any(|h| h == *a)) {
            return Err(IngestError::MissingColumn {
                kind: E::KIND,
                column: alternatives[0],
            });
        }
    }

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let parsed = record
            .deserialize::<E::Row>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(|row| E::from_row(row, report.rows.len()))
            .and_then(|entity| match entity.primary_id() {
                Some(id) if !seen.insert(id) => Err(format!("duplicate id {id}")),
                _ => Ok(entity),
            });
        match parsed {
            Ok(entity) => report.rows.push(entity),
            Err(reason) => {
                warn!(event = "row_skipped", kind = E::KIND, line, reason = %reason);
                report.skipped.push(RowDiagnostic { line, reason });
            }
        }
    }

    debug!(
        event = "csv_loaded",
        kind = E::KIND,
        rows = report.rows.len(),
        skipped = report.skipped.len(),
    );
    Ok(report)
}

/// Reads entities of type `E` from a CSV file.
pub fn load_csv<E: CsvEntity>(path: impl AsRef<Path>) -> Result<IngestReport<E>, IngestError> {
    let file = File::open(path.as_ref())?;
    read_csv(file)
}
