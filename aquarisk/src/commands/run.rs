// aquarisk/src/commands/run.rs
//
// USE CASE: Run the classification pipeline on one CSV batch.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::Table;

use aquarisk_core::application::{run_pipeline, summarize};
use aquarisk_core::infrastructure::config::load_project_config_or_default;
use aquarisk_core::infrastructure::csv::CsvRowSource;
use aquarisk_core::infrastructure::export::{write_rejections_csv, write_results_csv};
use aquarisk_core::infrastructure::fs::atomic_write;

pub async fn execute(
    input: PathBuf,
    project_dir: PathBuf,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_project_config_or_default(&project_dir)
        .with_context(|| format!("Failed to load configuration from {project_dir:?}"))?;
    println!("   Project: {} (v{})", config.name, config.version);

    // B. Instantiate the source adapter
    let source = CsvRowSource::new(&input);

    // C. Run the Pipeline (Application Layer)
    let batch = run_pipeline(&source, &config)
        .await
        .with_context(|| format!("Pipeline failed for {input:?}"))?;

    // D. Summary + artifacts
    let summary = summarize(&batch);

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Samples".to_string(), summary.total.to_string()]);
    table.add_row(vec!["Safe".to_string(), summary.safe.to_string()]);
    table.add_row(vec!["Unsafe".to_string(), summary.unsafe_count.to_string()]);
    table.add_row(vec![
        "Indeterminate".to_string(),
        summary.indeterminate.to_string(),
    ]);
    table.add_row(vec!["Rejected rows".to_string(), summary.rejected.to_string()]);
    table.add_row(vec![
        "Imputed fields".to_string(),
        summary.imputed_fields.to_string(),
    ]);
    table.add_row(vec![
        "Cut points".to_string(),
        format!(
            "low={:.4} / high={:.4}",
            summary.calibration.low, summary.calibration.high
        ),
    ]);
    println!("{table}");

    let target_dir = out_dir.unwrap_or_else(|| project_dir.join(&config.target_path));
    std::fs::create_dir_all(&target_dir)
        .with_context(|| format!("Could not create artifact dir {target_dir:?}"))?;

    write_results_csv(&batch, &target_dir.join("results.csv"))?;
    write_rejections_csv(&batch, &target_dir.join("rejections.csv"))?;
    atomic_write(
        target_dir.join("summary.json"),
        serde_json::to_vec_pretty(&summary)?,
    )?;
    println!("📦 Artifacts written to {}", target_dir.display());

    println!("\n✨ SUCCESS! Batch classified in {:.2?}", start.elapsed());
    Ok(())
}
