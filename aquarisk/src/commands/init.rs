// aquarisk/src/commands/init.rs
//
// USE CASE: Scaffold a project with the reference configuration, so the
// constants an analyst may want to tune are visible in files rather than
// buried in the binary.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};

use aquarisk_core::infrastructure::config::ProjectConfig;

pub fn execute(project_dir: PathBuf, force: bool) -> anyhow::Result<()> {
    let config = ProjectConfig::default();

    let main_path = project_dir.join("aquarisk.yaml");
    if main_path.exists() && !force {
        bail!("{main_path:?} already exists (use --force to overwrite)");
    }

    fs::create_dir_all(&project_dir)?;

    let main_yaml = serde_yaml::to_string(&config).context("Could not serialize config")?;
    fs::write(&main_path, main_yaml)?;
    println!("📝 Wrote {}", main_path.display());

    // Satellite fragment; its values override the main file on load
    let config_dir = project_dir.join("config");
    fs::create_dir_all(&config_dir)?;
    let map_path = config_dir.join("column_map.yml");
    if map_path.exists() && !force {
        bail!("{map_path:?} already exists (use --force to overwrite)");
    }
    #[derive(serde::Serialize)]
    struct ColumnMapWrapper<'a> {
        column_map: &'a aquarisk_core::domain::validation::ColumnMap,
    }
    let map_yaml = serde_yaml::to_string(&ColumnMapWrapper {
        column_map: &config.column_map,
    })?;
    fs::write(&map_path, map_yaml)?;
    println!("📝 Wrote {}", map_path.display());

    println!("✨ Project scaffolded. Edit config/column_map.yml to match your export.");
    Ok(())
}
