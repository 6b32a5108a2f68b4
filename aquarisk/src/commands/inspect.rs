// aquarisk/src/commands/inspect.rs
//
// USE CASE: Ad-hoc look at the riskiest samples of a CSV, no artifacts.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::Table;

use aquarisk_core::application::run_pipeline;
use aquarisk_core::infrastructure::config::load_project_config_or_default;
use aquarisk_core::infrastructure::csv::CsvRowSource;

pub async fn execute(input: PathBuf, project_dir: PathBuf, limit: usize) -> anyhow::Result<()> {
    let config = load_project_config_or_default(&project_dir)
        .with_context(|| format!("Failed to load configuration from {project_dir:?}"))?;

    let source = CsvRowSource::new(&input);
    let batch = run_pipeline(&source, &config)
        .await
        .with_context(|| format!("Pipeline failed for {input:?}"))?;

    let mut ranked: Vec<_> = batch.samples.iter().collect();
    ranked.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.set_header(vec!["Sample", "Timestamp", "Risk", "Label", "Flags"]);
    for s in ranked.into_iter().take(limit) {
        table.add_row(vec![
            s.id.clone(),
            s.timestamp
                .map(|t| t.to_string())
                .unwrap_or_else(|| "NA".to_string()),
            s.risk_score
                .map(|v| format!("{v:.4}"))
                .unwrap_or_default(),
            s.classification
                .map(|c| c.to_string())
                .unwrap_or_default(),
            s.flags_display(),
        ]);
    }
    println!("{table}");

    if !batch.rejected.is_empty() {
        println!("⚠️  {} rows rejected during validation", batch.rejected.len());
    }

    Ok(())
}
