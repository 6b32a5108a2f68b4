// aquarisk-core/src/application/mod.rs

pub mod pipeline;
pub mod report;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI do:
// `use aquarisk_core::application::{run_pipeline, summarize};`
// without knowing the internal file layout.

pub use pipeline::run_pipeline;
pub use report::{BatchSummary, summarize, unsafe_alerts};
