pub mod batch;
pub mod error;
pub mod risk;
pub mod sample;
pub mod validation;

// Convenience re-exports to simplify imports elsewhere
pub use error::DomainError;
pub use sample::{Classification, Parameter, WaterSample};
