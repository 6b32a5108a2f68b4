// aquarisk-core/src/application/pipeline.rs
//
// Orchestrates one batch end to end with strict phase ordering:
// fetch -> validate -> score every sample -> calibrate once -> classify.
// The caller gets either a complete, fully-classified Batch or a fatal
// error raised before any scoring happened. Never a half-scored batch.

use futures::StreamExt;
use tracing::warn;

use crate::domain::batch::Batch;
use crate::domain::error::DomainError;
use crate::domain::risk::calibration::CalibrationParams;
use crate::domain::risk::classify::classify_sample;
use crate::domain::sample::WaterSample;
use crate::domain::validation::validate_rows;
use crate::error::AquaRiskError;
use crate::infrastructure::config::ProjectConfig;
use crate::ports::row_source::RowSource;

/// Scoring is pure and per-sample, so samples are scored concurrently;
/// `buffered` keeps the output in input order.
const SCORING_CONCURRENCY: usize = 16;

pub async fn run_pipeline(
    source: &dyn RowSource,
    config: &ProjectConfig,
) -> Result<Batch, AquaRiskError> {
    println!("🚰 Starting batch pipeline...");

    // 0. Domain objects from config (invalid constants fail before any IO
    // result could look half-plausible)
    let model = config.model.build()?;
    let calibrator = config.calibration.build()?;
    let policy = config.imputation.build();

    // 1. FETCH (Port)
    let rows = source.fetch_rows().await?;
    println!("📥 Fetched {} rows", rows.rows.len());

    // 2. VALIDATE (Domain) — schema mismatch aborts here, row problems
    // become diagnostics
    let (samples, rejected) =
        validate_rows(&rows, &config.column_map, &config.validation, policy.as_ref())?;
    println!(
        "🧪 Validated: {} samples, {} rejected",
        samples.len(),
        rejected.len()
    );

    // An all-rejected input is a data situation, not a contract violation:
    // return the diagnostics with floor cut points instead of invoking the
    // calibrator on nothing.
    if samples.is_empty() {
        warn!("No sample survived validation; batch contains only diagnostics");
        return Ok(Batch {
            samples,
            rejected,
            calibration: CalibrationParams {
                low: config.calibration.unsafe_floor,
                high: config.calibration.unsafe_floor,
            },
        });
    }

    // 3. SCORE (Domain, concurrent per sample, order preserved)
    let model_ref = &model;
    let mut scored: Vec<WaterSample> = futures::stream::iter(samples.into_iter().map(
        |mut sample| async move {
            model_ref.score(&mut sample);
            sample
        },
    ))
    .buffered(SCORING_CONCURRENCY)
    .collect()
    .await;
    println!("📊 Scored {} samples", scored.len());

    // 4. CALIBRATE (Domain, whole-batch) — must see every score before any
    // classification happens
    let mut scores = Vec::with_capacity(scored.len());
    for s in &scored {
        scores.push(
            s.risk_score
                .ok_or_else(|| DomainError::UnscoredSample(s.id.clone()))?,
        );
    }
    let calibration = calibrator.calibrate(&scores)?;
    println!(
        "🎯 Calibrated cut points: low={:.4}, high={:.4}",
        calibration.low, calibration.high
    );

    // 5. CLASSIFY (Domain, per sample, using this batch's params only)
    for sample in &mut scored {
        classify_sample(sample, &calibration)?;
    }

    Ok(Batch {
        samples: scored,
        rejected,
        calibration,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::sample::Classification;
    use crate::ports::row_source::{RawRow, RowSet};
    use async_trait::async_trait;

    // --- MOCK SOURCE ---
    struct MockSource {
        rows: RowSet,
    }

    #[async_trait]
    impl RowSource for MockSource {
        async fn fetch_rows(&self) -> Result<RowSet, AquaRiskError> {
            Ok(self.rows.clone())
        }
    }

    const HEADERS: [&str; 8] = [
        "Record number",
        "Timestamp",
        "pH",
        "Turbidity",
        "Dissolved Oxygen",
        "Temperature",
        "Salinity",
        "Chlorophyll",
    ];

    fn source(data: &[&[&str]]) -> MockSource {
        MockSource {
            rows: RowSet {
                headers: HEADERS.iter().map(|h| h.to_string()).collect(),
                rows: data
                    .iter()
                    .enumerate()
                    .map(|(index, cells)| RawRow {
                        index,
                        cells: cells.iter().map(|c| c.to_string()).collect(),
                    })
                    .collect(),
            },
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_classifies_every_sample() {
        // One pristine, one middling, one filthy row
        let source = source(&[
            &["1", "", "7.2", "0.5", "8.0", "20.0", "0.1", "1.0"],
            &["2", "", "6.0", "5.0", "5.0", "28.0", "10.0", "20.0"],
            &["3", "", "3.0", "300.0", "0.5", "42.0", "80.0", "500.0"],
        ]);
        let config = ProjectConfig::default();

        let batch = run_pipeline(&source, &config).await.unwrap();
        assert_eq!(batch.samples.len(), 3);
        assert!(batch.rejected.is_empty());
        for s in &batch.samples {
            assert!(s.risk_score.is_some());
            assert!(s.classification.is_some());
        }
        // Batch-relative cut points: the cleanest row is Safe, the filthiest
        // Unsafe
        assert_eq!(batch.samples[0].classification, Some(Classification::Safe));
        assert_eq!(batch.samples[2].classification, Some(Classification::Unsafe));
        assert!(batch.calibration.low <= batch.calibration.high);
    }

    #[tokio::test]
    async fn test_pipeline_fails_fast_on_wrong_schema() {
        let source = MockSource {
            rows: RowSet {
                headers: vec!["x".to_string(), "y".to_string()],
                rows: vec![RawRow {
                    index: 0,
                    cells: vec!["1".to_string(), "2".to_string()],
                }],
            },
        };
        let err = run_pipeline(&source, &ProjectConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AquaRiskError::Domain(DomainError::Schema { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_rejected_input_yields_diagnostics_only_batch() {
        // Both rows miss 6 of 6 parameters
        let source = source(&[&["1", "", "", "", "", "", "", ""], &["2", "", "", "", "", "", "", ""]]);
        let batch = run_pipeline(&source, &ProjectConfig::default())
            .await
            .unwrap();
        assert!(batch.samples.is_empty());
        assert_eq!(batch.rejected.len(), 2);
        assert_eq!(batch.calibration.low, 0.60);
    }

    #[tokio::test]
    async fn test_identical_rows_classify_identically() {
        let row: &[&str] = &["0", "", "6.0", "5.0", "5.0", "28.0", "10.0", "20.0"];
        let mut data: Vec<Vec<String>> = Vec::new();
        for i in 0..4 {
            let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            cells[0] = i.to_string();
            data.push(cells);
        }
        let source = MockSource {
            rows: RowSet {
                headers: HEADERS.iter().map(|h| h.to_string()).collect(),
                rows: data
                    .into_iter()
                    .enumerate()
                    .map(|(index, cells)| RawRow { index, cells })
                    .collect(),
            },
        };

        let batch = run_pipeline(&source, &ProjectConfig::default())
            .await
            .unwrap();
        let first = batch.samples[0].classification;
        assert!(batch.samples.iter().all(|s| s.classification == first));
    }

    #[tokio::test]
    async fn test_pipeline_is_deterministic_across_runs() {
        let data: &[&[&str]] = &[
            &["1", "", "7.2", "0.5", "8.0", "20.0", "0.1", "1.0"],
            &["2", "", "6.0", "5.0", "5.0", "28.0", "10.0", "20.0"],
        ];
        let config = ProjectConfig::default();
        let a = run_pipeline(&source(data), &config).await.unwrap();
        let b = run_pipeline(&source(data), &config).await.unwrap();
        for (x, y) in a.samples.iter().zip(&b.samples) {
            assert_eq!(x.risk_score, y.risk_score);
            assert_eq!(x.classification, y.classification);
        }
    }
}
