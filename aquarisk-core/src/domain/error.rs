// aquarisk-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Schema mismatch: required columns not found for {missing:?}")]
    #[diagnostic(
        code(aquarisk::domain::schema),
        help("Available columns: {available:?}. Fix by editing the column_map.")
    )]
    Schema {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Calibration requires at least one scored sample")]
    #[diagnostic(
        code(aquarisk::domain::empty_calibration),
        help("This is a pipeline ordering defect, not a data problem.")
    )]
    EmptyCalibration,

    #[error("Sample '{0}' has no risk score; classification ran before scoring")]
    #[diagnostic(code(aquarisk::domain::unscored_sample))]
    UnscoredSample(String),

    #[error("Invalid model configuration: {0}")]
    #[diagnostic(code(aquarisk::domain::model_config))]
    InvalidModelConfig(String),
}
