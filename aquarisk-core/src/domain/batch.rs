// aquarisk-core/src/domain/batch.rs

use serde::Serialize;
use std::fmt;

use crate::domain::risk::calibration::CalibrationParams;
use crate::domain::sample::WaterSample;

/// Why a source row never became a `WaterSample`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum RejectReason {
    /// More fields missing than the policy tolerates
    TooManyMissing { missing: usize, max: usize },
    /// A previous row already used this id
    DuplicateId { id: String },
    /// The id cell itself was empty or absent
    MissingId,
    /// A vendor `[quality]` column carried a non-accepted QC code
    QualityFiltered {
        column: String,
        #[serde(rename = "qc_code")]
        code: String,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooManyMissing { missing, max } => {
                write!(f, "too_many_missing ({missing} of 6, max {max})")
            }
            RejectReason::DuplicateId { id } => write!(f, "duplicate_id ({id})"),
            RejectReason::MissingId => write!(f, "missing_id"),
            RejectReason::QualityFiltered { column, code } => {
                write!(f, "quality_filtered ({column}={code})")
            }
        }
    }
}

/// Diagnostic record for one rejected source row. Keeps the original row
/// index so analysts can trace the rejection back to the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Zero-based data row index in the source (header excluded)
    pub row: usize,
    pub id: Option<String>,
    pub reason: RejectReason,
}

/// The unit of calibration and classification: an ordered sequence of
/// samples, the rejection diagnostics, and the cut points derived from this
/// batch's own score distribution.
///
/// Classification of one sample is only well-defined relative to the batch it
/// was calibrated with, so the params travel with the samples.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub samples: Vec<WaterSample>,
    pub rejected: Vec<RejectedRow>,
    pub calibration: CalibrationParams,
}

impl Batch {
    pub fn label_counts(&self) -> (usize, usize, usize) {
        use crate::domain::sample::Classification::*;
        let mut counts = (0usize, 0usize, 0usize);
        for s in &self.samples {
            match s.classification {
                Some(Safe) => counts.0 += 1,
                Some(Unsafe) => counts.1 += 1,
                Some(Indeterminate) => counts.2 += 1,
                None => {}
            }
        }
        counts
    }
}
