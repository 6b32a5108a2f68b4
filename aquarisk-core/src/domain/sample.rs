// aquarisk-core/src/domain/sample.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The six physicochemical parameters every sample must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Ph,
    Turbidity,
    DissolvedOxygen,
    Temperature,
    Salinity,
    Chlorophyll,
}

impl Parameter {
    pub const ALL: [Parameter; 6] = [
        Parameter::Ph,
        Parameter::Turbidity,
        Parameter::DissolvedOxygen,
        Parameter::Temperature,
        Parameter::Salinity,
        Parameter::Chlorophyll,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Turbidity => "turbidity",
            Parameter::DissolvedOxygen => "dissolved_oxygen",
            Parameter::Temperature => "temperature",
            Parameter::Salinity => "salinity",
            Parameter::Chlorophyll => "chlorophyll",
        }
    }

    /// Plausible physical domain. Values outside are sensor/data errors,
    /// never real water chemistry.
    pub fn physical_domain(&self) -> (f64, f64) {
        match self {
            Parameter::Ph => (0.0, 14.0),
            Parameter::Temperature => (-5.0, 45.0),
            Parameter::Turbidity | Parameter::DissolvedOxygen => (0.0, f64::INFINITY),
            Parameter::Salinity | Parameter::Chlorophyll => (0.0, f64::INFINITY),
        }
    }

    pub fn in_domain(&self, value: f64) -> bool {
        let (low, high) = self.physical_domain();
        value >= low && value <= high
    }

    /// Neutral value used as last-resort imputation fallback: contributes a
    /// zero risk sub-score under the reference thresholds.
    pub fn neutral_value(&self) -> f64 {
        match self {
            Parameter::Ph => 7.5,
            Parameter::DissolvedOxygen => 8.0,
            Parameter::Temperature => 20.0,
            Parameter::Turbidity | Parameter::Salinity | Parameter::Chlorophyll => 0.0,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Why a field had no usable value in the source row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKind {
    /// Cell absent, empty or a known placeholder ("NA", "-", ...)
    Absent,
    /// Cell present but not a finite number
    Unparseable,
    /// Finite number outside the plausible physical domain
    OutOfRange,
}

impl fmt::Display for MissingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MissingKind::Absent => "absent",
            MissingKind::Unparseable => "unparseable",
            MissingKind::OutOfRange => "out_of_range",
        };
        write!(f, "{s}")
    }
}

/// Result of coercing one raw cell. The "missing" cases stay tagged data,
/// never sentinel values, so downstream code cannot mistake them for readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldReading {
    Valid(f64),
    Missing(MissingKind),
}

impl FieldReading {
    pub fn valid(&self) -> Option<f64> {
        match self {
            FieldReading::Valid(v) => Some(*v),
            FieldReading::Missing(_) => None,
        }
    }
}

/// Per-field marker kept on the sample for interpretability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityFlag {
    pub parameter: Parameter,
    pub kind: FlagKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Field was filled by the imputation policy; the original reading was
    /// missing for the recorded reason.
    Imputed(MissingKind),
    /// In-domain reading that saturates its risk sub-score at 1.0.
    Extreme,
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FlagKind::Imputed(why) => write!(f, "{}:imputed:{}", self.parameter, why),
            FlagKind::Extreme => write!(f, "{}:extreme", self.parameter),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Safe,
    Unsafe,
    Indeterminate,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Safe => "Safe",
            Classification::Unsafe => "Unsafe",
            Classification::Indeterminate => "Indeterminate",
        };
        write!(f, "{s}")
    }
}

/// One validated water-quality reading plus derived fields.
///
/// Lifecycle: built by the validator (or rejected, never half-constructed),
/// `risk_score` set by the risk model, `classification` set by the classifier,
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterSample {
    pub id: String,
    pub timestamp: Option<NaiveDateTime>,

    pub ph: f64,
    pub turbidity: f64,
    pub dissolved_oxygen: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub chlorophyll: f64,

    pub quality_flags: Vec<QualityFlag>,
    pub risk_score: Option<f64>,
    pub classification: Option<Classification>,
}

impl WaterSample {
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Turbidity => self.turbidity,
            Parameter::DissolvedOxygen => self.dissolved_oxygen,
            Parameter::Temperature => self.temperature,
            Parameter::Salinity => self.salinity,
            Parameter::Chlorophyll => self.chlorophyll,
        }
    }

    pub fn is_imputed(&self, parameter: Parameter) -> bool {
        self.quality_flags
            .iter()
            .any(|f| f.parameter == parameter && matches!(f.kind, FlagKind::Imputed(_)))
    }

    pub fn flags_display(&self) -> String {
        self.quality_flags
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Sort key: timestamp first when both sides have one, id as tie-breaker.
    pub fn chronological_cmp(&self, other: &WaterSample) -> Ordering {
        match (self.timestamp, other.timestamp) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.id.cmp(&other.id)),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl fmt::Display for WaterSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self
            .timestamp
            .map(|t| t.to_string())
            .unwrap_or_else(|| "NA".to_string());
        write!(
            f,
            "WaterSample(id={}, ts={}, ph={:.2}, turb={:.2}, DO={:.2}, temp={:.2}, sal={:.2}, chl={:.2})",
            self.id,
            ts,
            self.ph,
            self.turbidity,
            self.dissolved_oxygen,
            self.temperature,
            self.salinity,
            self.chlorophyll
        )
    }
}

/// Lenient timestamp parsing for the formats seen in sensor exports.
/// Unknown formats yield `None`; a bad timestamp never rejects a row.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() || matches!(s.to_ascii_lowercase().as_str(), "na" | "nan" | "none") {
        return None;
    }

    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }

    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample(id: &str, ts: Option<&str>) -> WaterSample {
        WaterSample {
            id: id.to_string(),
            timestamp: ts.and_then(parse_timestamp),
            ph: 7.2,
            turbidity: 1.0,
            dissolved_oxygen: 8.0,
            temperature: 21.0,
            salinity: 0.5,
            chlorophyll: 2.0,
            quality_flags: vec![],
            risk_score: None,
            classification: None,
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-01-01 10:30:00").is_some());
        assert!(parse_timestamp("2025-01-01T10:30:00").is_some());
        assert!(parse_timestamp("31/12/2024 23:59:59").is_some());
        assert!(parse_timestamp("2025-01-01").is_some());
        assert!(parse_timestamp("31/12/2024").is_some());
    }

    #[test]
    fn test_parse_timestamp_placeholders() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("  "), None);
        assert_eq!(parse_timestamp("NA"), None);
        assert_eq!(parse_timestamp("nan"), None);
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_chronological_cmp_prefers_timestamp() {
        let early = sample("z", Some("2025-01-01 00:00:00"));
        let late = sample("a", Some("2025-06-01 00:00:00"));
        assert_eq!(early.chronological_cmp(&late), Ordering::Less);
    }

    #[test]
    fn test_chronological_cmp_falls_back_to_id() {
        let a = sample("a", None);
        let b = sample("b", Some("2025-01-01 00:00:00"));
        assert_eq!(a.chronological_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_neutral_values_are_in_domain() {
        for p in Parameter::ALL {
            assert!(p.in_domain(p.neutral_value()), "{p} neutral out of domain");
        }
    }

    #[test]
    fn test_flag_display() {
        let flag = QualityFlag {
            parameter: Parameter::Ph,
            kind: FlagKind::Imputed(MissingKind::Unparseable),
        };
        assert_eq!(flag.to_string(), "ph:imputed:unparseable");
    }
}
