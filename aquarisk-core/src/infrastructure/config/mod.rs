pub mod project;

pub use project::{
    CalibrationConfig, ImputationConfig, ImputationPolicyKind, ModelConfig, ProjectConfig,
    load_project_config, load_project_config_or_default,
};
