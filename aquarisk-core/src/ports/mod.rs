pub mod row_source;

pub use row_source::{RawRow, RowSet, RowSource};
