// aquarisk-core/src/domain/validation/mod.rs
//
// Turns raw rows into WaterSample entities or rejection diagnostics. Row
// problems are always recovered locally (reject or impute); only a
// whole-input schema mismatch aborts.

pub mod column_map;
pub mod impute;

pub use column_map::ColumnMap;
pub use impute::{ConfiguredDefault, ImputationPolicy, ParameterHistory, RunningMedian};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::batch::{RejectReason, RejectedRow};
use crate::domain::error::DomainError;
use crate::domain::sample::{
    FieldReading, FlagKind, MissingKind, Parameter, QualityFlag, WaterSample, parse_timestamp,
};
use crate::ports::row_source::{RawRow, RowSet};

/// Row-level validation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// A row missing MORE than this many of the six parameters is rejected;
    /// at or below, the missing fields are imputed.
    pub max_missing: usize,
    /// Honor vendor `[quality]` QC columns when present.
    pub use_quality_filter: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_missing: 3,
            use_quality_filter: true,
        }
    }
}

/// Placeholder cells treated as absent rather than unparseable.
const PLACEHOLDERS: [&str; 6] = ["na", "n/a", "nan", "none", "null", "-"];

/// QC codes accepted by the `[quality]` filter (case-insensitive).
const ACCEPTED_QC_CODES: [&str; 5] = ["0", "1", "good", "ok", "true"];

/// Coerce one raw cell into a tagged reading. A bad cell is data, not an
/// error: the caller decides between imputation and rejection.
pub fn coerce_field(raw: Option<&str>, parameter: Parameter) -> FieldReading {
    let Some(cell) = raw else {
        return FieldReading::Missing(MissingKind::Absent);
    };
    let cell = cell.trim();
    if cell.is_empty() || PLACEHOLDERS.contains(&cell.to_ascii_lowercase().as_str()) {
        return FieldReading::Missing(MissingKind::Absent);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if parameter.in_domain(value) {
                FieldReading::Valid(value)
            } else {
                FieldReading::Missing(MissingKind::OutOfRange)
            }
        }
        _ => FieldReading::Missing(MissingKind::Unparseable),
    }
}

/// Column indices resolved once per input.
struct ResolvedColumns {
    id: usize,
    timestamp: Option<usize>,
    parameters: [usize; 6],
    quality: Vec<usize>,
}

/// Fail-fast schema check: every required canonical field must resolve to a
/// header column. Anything less means the whole file is wrong, and scoring a
/// wrongly-parsed file would produce scores that look valid but mean nothing.
fn resolve_columns(rows: &RowSet, map: &ColumnMap) -> Result<ResolvedColumns, DomainError> {
    let mut missing: Vec<String> = Vec::new();

    let id = match rows.column_index(&map.sample_id) {
        Some(i) => i,
        None => {
            missing.push("sample_id".to_string());
            0
        }
    };

    let mut parameters = [0usize; 6];
    for (slot, parameter) in Parameter::ALL.iter().enumerate() {
        match rows.column_index(map.column_for(*parameter)) {
            Some(i) => parameters[slot] = i,
            None => missing.push(parameter.canonical_name().to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(DomainError::Schema {
            missing,
            available: rows.headers.clone(),
        });
    }

    // Timestamp is optional: an unmapped or absent column just yields None
    let timestamp = map
        .timestamp
        .as_deref()
        .and_then(|name| rows.column_index(name));

    let quality = rows
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.ends_with("[quality]"))
        .map(|(i, _)| i)
        .collect();

    Ok(ResolvedColumns {
        id,
        timestamp,
        parameters,
        quality,
    })
}

fn quality_violation(row: &RawRow, columns: &ResolvedColumns, rows: &RowSet) -> Option<(String, String)> {
    for &qc in &columns.quality {
        if let Some(cell) = row.cell(qc) {
            let code = cell.trim();
            if code.is_empty() {
                continue;
            }
            if !ACCEPTED_QC_CODES.contains(&code.to_ascii_lowercase().as_str()) {
                return Some((rows.headers[qc].clone(), code.to_string()));
            }
        }
    }
    None
}

/// Validate every row in order. Returns the accepted samples (input order
/// preserved, unscored) and the rejection diagnostics.
pub fn validate_rows(
    rows: &RowSet,
    map: &ColumnMap,
    options: &ValidationOptions,
    policy: &dyn ImputationPolicy,
) -> Result<(Vec<WaterSample>, Vec<RejectedRow>), DomainError> {
    let columns = resolve_columns(rows, map)?;

    let mut samples: Vec<WaterSample> = Vec::with_capacity(rows.rows.len());
    let mut rejected: Vec<RejectedRow> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut history = ParameterHistory::default();

    for row in &rows.rows {
        // 1. Vendor QC codes (conservative: an unknown code drops the row)
        if options.use_quality_filter
            && let Some((column, code)) = quality_violation(row, &columns, rows)
        {
            rejected.push(RejectedRow {
                row: row.index,
                id: None,
                reason: RejectReason::QualityFiltered { column, code },
            });
            continue;
        }

        // 2. Identity
        let id = row.cell(columns.id).map(str::trim).unwrap_or_default();
        if id.is_empty() {
            rejected.push(RejectedRow {
                row: row.index,
                id: None,
                reason: RejectReason::MissingId,
            });
            continue;
        }
        if seen_ids.contains(id) {
            rejected.push(RejectedRow {
                row: row.index,
                id: Some(id.to_string()),
                reason: RejectReason::DuplicateId { id: id.to_string() },
            });
            continue;
        }

        // 3. Per-field coercion (a single bad field never drops the row)
        let mut readings = [FieldReading::Missing(MissingKind::Absent); 6];
        for (slot, parameter) in Parameter::ALL.iter().enumerate() {
            readings[slot] = coerce_field(row.cell(columns.parameters[slot]), *parameter);
        }

        let missing = readings.iter().filter(|r| r.valid().is_none()).count();
        if missing > options.max_missing {
            warn!(row = row.index, missing, "Row rejected: too many missing fields");
            rejected.push(RejectedRow {
                row: row.index,
                id: Some(id.to_string()),
                reason: RejectReason::TooManyMissing {
                    missing,
                    max: options.max_missing,
                },
            });
            continue;
        }

        // 4. Imputation: fill the gaps, flag every filled field
        let mut values = [0.0f64; 6];
        let mut quality_flags: Vec<QualityFlag> = Vec::new();
        for (slot, parameter) in Parameter::ALL.iter().enumerate() {
            match readings[slot] {
                FieldReading::Valid(v) => values[slot] = v,
                FieldReading::Missing(kind) => {
                    values[slot] = policy.impute(*parameter, &history);
                    quality_flags.push(QualityFlag {
                        parameter: *parameter,
                        kind: FlagKind::Imputed(kind),
                    });
                }
            }
        }
        if !quality_flags.is_empty() {
            debug!(row = row.index, imputed = quality_flags.len(), policy = policy.name(), "Imputed missing fields");
        }

        // 5. Only genuine readings feed the history, never imputed ones
        for (slot, parameter) in Parameter::ALL.iter().enumerate() {
            if let FieldReading::Valid(v) = readings[slot] {
                history.push(*parameter, v);
            }
        }

        let timestamp = columns
            .timestamp
            .and_then(|ts| row.cell(ts))
            .and_then(parse_timestamp);

        seen_ids.insert(id.to_string());
        samples.push(WaterSample {
            id: id.to_string(),
            timestamp,
            ph: values[0],
            turbidity: values[1],
            dissolved_oxygen: values[2],
            temperature: values[3],
            salinity: values[4],
            chlorophyll: values[5],
            quality_flags,
            risk_score: None,
            classification: None,
        });
    }

    Ok((samples, rejected))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row_set(headers: &[&str], data: &[&[&str]]) -> RowSet {
        RowSet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: data
                .iter()
                .enumerate()
                .map(|(index, cells)| RawRow {
                    index,
                    cells: cells.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }

    const HEADERS: [&str; 8] = [
        "Record number",
        "Timestamp",
        "pH",
        "Turbidity",
        "Dissolved Oxygen",
        "Temperature",
        "Salinity",
        "Chlorophyll",
    ];

    fn validate(
        rows: &RowSet,
    ) -> Result<(Vec<WaterSample>, Vec<RejectedRow>), DomainError> {
        validate_rows(
            rows,
            &ColumnMap::default(),
            &ValidationOptions::default(),
            &RunningMedian,
        )
    }

    #[test]
    fn test_coerce_field_tags_each_failure_mode() {
        use Parameter::Ph;
        assert_eq!(coerce_field(Some("7.2"), Ph), FieldReading::Valid(7.2));
        assert_eq!(
            coerce_field(None, Ph),
            FieldReading::Missing(MissingKind::Absent)
        );
        assert_eq!(
            coerce_field(Some("  "), Ph),
            FieldReading::Missing(MissingKind::Absent)
        );
        assert_eq!(
            coerce_field(Some("N/A"), Ph),
            FieldReading::Missing(MissingKind::Absent)
        );
        assert_eq!(
            coerce_field(Some("7..2"), Ph),
            FieldReading::Missing(MissingKind::Unparseable)
        );
        assert_eq!(
            coerce_field(Some("inf"), Ph),
            FieldReading::Missing(MissingKind::Unparseable)
        );
        assert_eq!(
            coerce_field(Some("17.0"), Ph),
            FieldReading::Missing(MissingKind::OutOfRange)
        );
        assert_eq!(
            coerce_field(Some("-3.0"), Parameter::Turbidity),
            FieldReading::Missing(MissingKind::OutOfRange)
        );
    }

    #[test]
    fn test_clean_row_produces_unflagged_sample() {
        let rows = row_set(
            &HEADERS,
            &[&["1", "2025-01-01 00:00:00", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0"]],
        );
        let (samples, rejected) = validate(&rows).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(rejected.is_empty());
        assert_eq!(samples[0].id, "1");
        assert!(samples[0].quality_flags.is_empty());
        assert!(samples[0].timestamp.is_some());
        assert_eq!(samples[0].risk_score, None);
    }

    #[test]
    fn test_two_missing_fields_are_imputed_not_rejected() {
        // pH unparseable, dissolved oxygen empty: 2 of 6 missing, below the
        // reject threshold of >3
        let rows = row_set(
            &HEADERS,
            &[&["1", "", "N/A", "5.2", "", "22", "0.5", "3"]],
        );
        let (samples, rejected) = validate(&rows).unwrap();
        assert!(rejected.is_empty());
        let s = &samples[0];
        assert!(s.is_imputed(Parameter::Ph));
        assert!(s.is_imputed(Parameter::DissolvedOxygen));
        assert!(!s.is_imputed(Parameter::Turbidity));
        assert_eq!(s.quality_flags.len(), 2);
    }

    #[test]
    fn test_exactly_three_missing_is_still_imputed() {
        let rows = row_set(&HEADERS, &[&["1", "", "", "", "", "22", "0.5", "3"]]);
        let (samples, rejected) = validate(&rows).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(rejected.is_empty());
        assert_eq!(samples[0].quality_flags.len(), 3);
    }

    #[test]
    fn test_four_missing_fields_rejects_the_row() {
        let rows = row_set(&HEADERS, &[&["1", "", "", "", "", "", "0.5", "3"]]);
        let (samples, rejected) = validate(&rows).unwrap();
        assert!(samples.is_empty());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].row, 0);
        assert!(matches!(
            rejected[0].reason,
            RejectReason::TooManyMissing { missing: 4, max: 3 }
        ));
    }

    #[test]
    fn test_out_of_range_is_missing_not_trusted() {
        // pH 17 is physically impossible: flagged, imputed, never clamped
        let rows = row_set(
            &HEADERS,
            &[&["1", "", "17.0", "3.0", "8.1", "22.0", "0.5", "4.0"]],
        );
        let (samples, _) = validate(&rows).unwrap();
        let s = &samples[0];
        assert!(s.is_imputed(Parameter::Ph));
        assert_ne!(s.ph, 17.0);
        let flag = &s.quality_flags[0];
        assert!(matches!(flag.kind, FlagKind::Imputed(MissingKind::OutOfRange)));
    }

    #[test]
    fn test_duplicate_id_rejects_later_row() {
        let rows = row_set(
            &HEADERS,
            &[
                &["7", "", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0"],
                &["7", "", "7.0", "2.0", "8.0", "21.0", "0.4", "3.0"],
            ],
        );
        let (samples, rejected) = validate(&rows).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].row, 1);
        assert!(matches!(rejected[0].reason, RejectReason::DuplicateId { .. }));
    }

    #[test]
    fn test_missing_id_rejects_row() {
        let rows = row_set(
            &HEADERS,
            &[&["", "", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0"]],
        );
        let (samples, rejected) = validate(&rows).unwrap();
        assert!(samples.is_empty());
        assert!(matches!(rejected[0].reason, RejectReason::MissingId));
    }

    #[test]
    fn test_wrong_schema_fails_fast() {
        let rows = row_set(&["foo", "bar"], &[&["1", "2"]]);
        let err = validate(&rows).unwrap_err();
        match err {
            DomainError::Schema { missing, available } => {
                assert!(missing.contains(&"ph".to_string()));
                assert!(missing.contains(&"sample_id".to_string()));
                assert_eq!(available, vec!["foo".to_string(), "bar".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_running_median_imputation_uses_prior_rows() {
        let rows = row_set(
            &HEADERS,
            &[
                &["1", "", "7.0", "2.0", "8.0", "20.0", "0.5", "3.0"],
                &["2", "", "8.0", "4.0", "8.0", "20.0", "0.5", "3.0"],
                &["3", "", "", "3.0", "8.0", "20.0", "0.5", "3.0"],
            ],
        );
        let (samples, _) = validate(&rows).unwrap();
        // Median of [7.0, 8.0] seen before row 3
        assert_eq!(samples[2].ph, 7.5);
    }

    #[test]
    fn test_quality_filter_rejects_bad_qc_code() {
        let mut headers: Vec<&str> = HEADERS.to_vec();
        headers.push("pH [quality]");
        let rows = row_set(
            &headers,
            &[
                &["1", "", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0", "good"],
                &["2", "", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0", "suspect"],
            ],
        );
        let (samples, rejected) = validate(&rows).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            &rejected[0].reason,
            RejectReason::QualityFiltered { code, .. } if code == "suspect"
        ));
    }

    #[test]
    fn test_quality_filter_can_be_disabled() {
        let mut headers: Vec<&str> = HEADERS.to_vec();
        headers.push("pH [quality]");
        let rows = row_set(
            &headers,
            &[&["1", "", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0", "suspect"]],
        );
        let options = ValidationOptions {
            use_quality_filter: false,
            ..Default::default()
        };
        let (samples, rejected) =
            validate_rows(&rows, &ColumnMap::default(), &options, &RunningMedian).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_short_row_counts_trailing_cells_as_absent() {
        let rows = row_set(&HEADERS, &[&["1", "", "7.2", "3.0", "8.1", "22.0"]]);
        let (samples, rejected) = validate(&rows).unwrap();
        // salinity + chlorophyll absent: 2 missing, imputed
        assert_eq!(samples.len(), 1);
        assert!(rejected.is_empty());
        assert_eq!(samples[0].quality_flags.len(), 2);
    }

    #[test]
    fn test_input_order_is_preserved() {
        let rows = row_set(
            &HEADERS,
            &[
                &["b", "", "7.2", "3.0", "8.1", "22.0", "0.5", "4.0"],
                &["a", "", "7.0", "2.0", "8.0", "21.0", "0.4", "3.0"],
            ],
        );
        let (samples, _) = validate(&rows).unwrap();
        assert_eq!(samples[0].id, "b");
        assert_eq!(samples[1].id, "a");
    }
}
