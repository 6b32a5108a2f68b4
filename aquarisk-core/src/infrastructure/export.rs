// aquarisk-core/src/infrastructure/export.rs
//
// CSV persistence of a classified batch, for the analysis/reporting side.
// Both files are written atomically so a crashed run never leaves a partial
// artifact behind.

use std::path::Path;

use tracing::info;

use crate::domain::batch::Batch;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

const RESULTS_HEADER: [&str; 11] = [
    "sample_id",
    "timestamp",
    "ph",
    "turbidity",
    "dissolved_oxygen",
    "temperature",
    "salinity",
    "chlorophyll",
    "quality_flags",
    "risk_score",
    "classification",
];

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, InfrastructureError> {
    writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(std::io::Error::other(e.to_string())))
}

/// Write every classified sample, one row per sample, input order preserved.
pub fn write_results_csv(batch: &Batch, path: &Path) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(RESULTS_HEADER)?;

    for s in &batch.samples {
        let ts = s.timestamp.map(|t| t.to_string()).unwrap_or_default();
        let score = s
            .risk_score
            .map(|v| format!("{v:.6}"))
            .unwrap_or_default();
        let label = s
            .classification
            .map(|c| c.to_string())
            .unwrap_or_default();
        writer.write_record([
            s.id.as_str(),
            ts.as_str(),
            &format!("{:.4}", s.ph),
            &format!("{:.4}", s.turbidity),
            &format!("{:.4}", s.dissolved_oxygen),
            &format!("{:.4}", s.temperature),
            &format!("{:.4}", s.salinity),
            &format!("{:.4}", s.chlorophyll),
            &s.flags_display(),
            &score,
            &label,
        ])?;
    }

    atomic_write(path, finish(writer)?)?;
    info!(path = ?path, samples = batch.samples.len(), "Results written");
    Ok(())
}

/// Write the rejection diagnostics: source row index, id when one was
/// readable, and the reason code.
pub fn write_rejections_csv(batch: &Batch, path: &Path) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["row", "sample_id", "reason"])?;

    for r in &batch.rejected {
        writer.write_record([
            r.row.to_string().as_str(),
            r.id.as_deref().unwrap_or(""),
            &r.reason.to_string(),
        ])?;
    }

    atomic_write(path, finish(writer)?)?;
    Ok(())
}
