// aquarisk-core/src/infrastructure/csv.rs
//
// CSV adapter for the RowSource port. Only mechanics live here: header and
// cell extraction. What a cell MEANS (missing, out of range, placeholder)
// is the domain validator's business.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::error::AquaRiskError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::row_source::{RawRow, RowSet, RowSource};

pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RowSource for CsvRowSource {
    async fn fetch_rows(&self) -> Result<RowSet, AquaRiskError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            // Sensor exports frequently have ragged tails; short rows become
            // absent fields downstream instead of hard errors here
            .flexible(true)
            .from_path(&self.path)
            .map_err(InfrastructureError::Csv)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(InfrastructureError::Csv)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(InfrastructureError::Csv)?;
            let cells: Vec<String> = record
                .iter()
                .take(headers.len())
                .map(|c| c.to_string())
                .collect();
            rows.push(RawRow { index, cells });
        }

        info!(path = ?self.path, rows = rows.len(), "Loaded tabular input");
        Ok(RowSet { headers, rows })
    }
}
