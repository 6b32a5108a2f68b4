// aquarisk-core/src/infrastructure/config/project.rs

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::risk::calibration::{CalibrationScheme, Calibrator};
use crate::domain::risk::model::{RiskModel, RiskThresholds, RiskWeights};
use crate::domain::sample::Parameter;
use crate::domain::validation::column_map::ColumnMap;
use crate::domain::validation::impute::{ConfiguredDefault, ImputationPolicy, RunningMedian};
use crate::domain::validation::ValidationOptions;
use crate::infrastructure::error::InfrastructureError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    /// Run artifacts (results.csv, rejections.csv, summary.json) land here
    pub target_path: String,
    /// Folders scanned for satellite config fragments
    pub config_paths: Vec<String>,

    pub validation: ValidationOptions,
    pub imputation: ImputationConfig,
    pub calibration: CalibrationConfig,
    pub column_map: ColumnMap,
    pub model: ModelConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "aquarisk".to_string(),
            version: "0.1.0".to_string(),
            target_path: "target/aquarisk".to_string(),
            config_paths: vec!["config".to_string()],
            validation: ValidationOptions::default(),
            imputation: ImputationConfig::default(),
            calibration: CalibrationConfig::default(),
            column_map: ColumnMap::default(),
            model: ModelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub thresholds: RiskThresholds,
    pub weights: RiskWeights,
}

impl ModelConfig {
    pub fn build(&self) -> Result<RiskModel, DomainError> {
        RiskModel::new(self.thresholds.clone(), self.weights.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationPolicyKind {
    #[default]
    RunningMedian,
    ConfiguredDefault,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputationConfig {
    pub policy: ImputationPolicyKind,
    /// Only used by the configured_default policy
    pub defaults: BTreeMap<Parameter, f64>,
}

impl ImputationConfig {
    pub fn build(&self) -> Box<dyn ImputationPolicy> {
        match self.policy {
            ImputationPolicyKind::RunningMedian => Box::new(RunningMedian),
            ImputationPolicyKind::ConfiguredDefault => {
                Box::new(ConfiguredDefault::new(self.defaults.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub low_pct: f64,
    pub high_pct: f64,
    /// Absolute boundary used when a batch's score distribution degenerates
    pub unsafe_floor: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            low_pct: 25.0,
            high_pct: 75.0,
            unsafe_floor: 0.60,
        }
    }
}

impl CalibrationConfig {
    pub fn build(&self) -> Result<Calibrator, DomainError> {
        Calibrator::new(
            CalibrationScheme::Percentile {
                low_pct: self.low_pct,
                high_pct: self.high_pct,
            },
            self.unsafe_floor,
        )
    }
}

// --- LOADER ---

pub const CONFIG_CANDIDATES: [&str; 2] = ["aquarisk.yaml", "aquarisk_project.yaml"];

#[instrument(skip(project_dir))] // Automatic entry/exit logging
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Main file discovery
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Base YAML load
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Satellite hydration (Fail-Secure: a corrupt fragment stops the run)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }

    // 4. Environment-variable overrides (layering pattern)
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Same as `load_project_config`, but a missing main file falls back to the
/// built-in defaults instead of failing — useful for one-shot CLI runs on a
/// bare CSV.
pub fn load_project_config_or_default(
    project_dir: &Path,
) -> Result<ProjectConfig, InfrastructureError> {
    match load_project_config(project_dir) {
        Ok(config) => Ok(config),
        Err(InfrastructureError::ConfigNotFound(_)) => {
            warn!("No project configuration found, using built-in defaults");
            let mut config = ProjectConfig::default();
            apply_env_overrides(&mut config);
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

// --- GENERIC LOGIC ---

/// Load a typed configuration fragment from a file.
/// T is the wrapper struct type expected inside the file.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(Into::into)
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    // A. Column map (canonical field -> source column)
    let map_path = config_dir.join("column_map.yml");
    if map_path.exists() {
        #[derive(Deserialize)]
        struct ColumnMapWrapper {
            column_map: ColumnMap,
        }

        // Note the '?': a corrupt fragment ABORTS the whole load.
        let wrapper: ColumnMapWrapper = load_fragment(&map_path)?;
        config.column_map = wrapper.column_map;
        info!("  🗺️ Column map loaded");
    }

    // B. Model constants (thresholds / weights)
    let model_path = config_dir.join("model.yml");
    if model_path.exists() {
        #[derive(Deserialize)]
        struct ModelWrapper {
            thresholds: Option<RiskThresholds>,
            weights: Option<RiskWeights>,
        }

        let wrapper: ModelWrapper = load_fragment(&model_path)?;
        if let Some(thresholds) = wrapper.thresholds {
            config.model.thresholds = thresholds;
        }
        if let Some(weights) = wrapper.weights {
            config.model.weights = weights;
        }
        info!("  ⚖️ Model constants loaded");
    }

    Ok(())
}

fn apply_env_overrides(config: &mut ProjectConfig) {
    // Simple manual layering; a full override matrix would use 'envy' or
    // 'figment'.
    if let Ok(val) = std::env::var("AQUARISK_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Ok(val) = std::env::var("AQUARISK_UNSAFE_FLOOR")
        && let Ok(floor) = val.parse::<f64>()
    {
        info!(floor, "Overriding unsafe floor via ENV");
        config.calibration.unsafe_floor = floor;
    }
}
