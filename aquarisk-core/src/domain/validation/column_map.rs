// aquarisk-core/src/domain/validation/column_map.rs

use serde::{Deserialize, Serialize};

use crate::domain::sample::Parameter;

/// Canonical field -> source column name. Supplied by the caller; the core
/// never guesses a schema. Defaults match the Brisbane water-quality export
/// this tool was first built against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnMap {
    pub sample_id: String,
    pub timestamp: Option<String>,
    pub ph: String,
    pub turbidity: String,
    pub dissolved_oxygen: String,
    pub temperature: String,
    pub salinity: String,
    pub chlorophyll: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            sample_id: "Record number".to_string(),
            timestamp: Some("Timestamp".to_string()),
            ph: "pH".to_string(),
            turbidity: "Turbidity".to_string(),
            dissolved_oxygen: "Dissolved Oxygen".to_string(),
            temperature: "Temperature".to_string(),
            salinity: "Salinity".to_string(),
            chlorophyll: "Chlorophyll".to_string(),
        }
    }
}

impl ColumnMap {
    pub fn column_for(&self, parameter: Parameter) -> &str {
        match parameter {
            Parameter::Ph => &self.ph,
            Parameter::Turbidity => &self.turbidity,
            Parameter::DissolvedOxygen => &self.dissolved_oxygen,
            Parameter::Temperature => &self.temperature,
            Parameter::Salinity => &self.salinity,
            Parameter::Chlorophyll => &self.chlorophyll,
        }
    }
}
