// aquarisk-core/src/ports/row_source.rs

// This file defines what the pipeline needs from a tabular source, without
// knowing how the rows are produced (CSV file, in-memory fixture, ...).

use crate::error::AquaRiskError;
use async_trait::async_trait;

/// One untyped source row: cells in header order, plus the zero-based data
/// row index for traceability. Cells past the header are dropped by the
/// adapter; short rows simply have fewer cells.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub index: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn cell(&self, column_index: usize) -> Option<&str> {
        self.cells.get(column_index).map(String::as_str)
    }
}

/// A whole tabular input: the header names and every data row, in source
/// order.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RowSet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<RowSet, AquaRiskError>;
}
