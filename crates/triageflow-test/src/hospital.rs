//! Hospital fixtures.
//!
//! # Example
//!
//! ```
//! use triageflow_test::hospital::{hospital, patient};
//!
//! let h = hospital(1, [1, 0, 0, 0]);
//! assert_eq!(h.beds.critical, 1);
//! assert_eq!(patient(4, 1).priority_level, 1);
//! ```

use triageflow_core::{BandBeds, Hospital, HospitalTransfer, Patient};

/// An unassigned patient with the given priority level.
pub fn patient(id: u64, priority_level: i64) -> Patient {
    Patient::new(id, format!("patient-{id}"), priority_level)
}

/// A hospital with beds given as `[critical, top, mid, low]`.
pub fn hospital(id: u64, beds: [i64; 4]) -> Hospital {
    Hospital::new(
        id,
        format!("hospital-{id}"),
        BandBeds::new(beds[0], beds[1], beds[2], beds[3]),
    )
}

/// A transfer link between two hospitals.
pub fn transfer(id: u64, from_hospital: u64, to_hospital: u64, capacity: i64) -> HospitalTransfer {
    HospitalTransfer {
        id,
        from_hospital,
        to_hospital,
        capacity,
    }
}
