//! Run orchestration: input discovery, batched fetching and persistence.
//!
//! A run walks every `*.txt` source in the input directory in name order.
//! For each source the identifiers are deduplicated, partitioned into
//! provider-sized batches and fetched one batch at a time through a single
//! rate limiter. Each batch is persisted as soon as it is normalized; the
//! aggregated, discount-ranked artifact is written once all sources are done.

pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;

pub use error::PipelineError;
pub use input::{discover_sources, read_source, InputSource};
pub use output::{batch_file_path, FINAL_ARTIFACT};
pub use pipeline::{Pipeline, PipelineOptions, RunStats, SourcePlan};
