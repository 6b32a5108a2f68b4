pub mod calibration;
pub mod classify;
pub mod model;

pub use calibration::{CalibrationParams, CalibrationScheme, Calibrator};
pub use classify::{classify_sample, classify_score};
pub use model::{RiskModel, RiskThresholds, RiskWeights};
