//! Pipeline module.
//!
//! This module provides the transform stage and the pipeline that runs all
//! stages in order.

mod builder;
pub mod progress;
pub mod transformer;

pub use builder::{Pipeline, PipelineBuilder, RunSummary};
pub use progress::{ClosureProgressReporter, EtlStage, ProgressReporter, ProgressUpdate};
pub use transformer::{TransformSummary, Transformer};
