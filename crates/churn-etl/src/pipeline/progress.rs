//! Progress reporting for a full ETL run.
//!
//! A [`Pipeline`](super::Pipeline) emits one [`ProgressUpdate`] when each
//! stage starts and one when the run finishes or fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use churn_etl::Pipeline;
//!
//! let summary = Pipeline::builder()
//!     .store(store)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the ETL run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtlStage {
    /// Copying the source file into raw staging
    Extract,
    /// Cleaning and deriving the staged table
    Transform,
    /// Inserting the staged table into the store
    Load,
    /// Comparing the loaded table with the staged file
    Validate,
    /// Computing summary metrics and charts
    Analyze,
    /// Run completed successfully
    Complete,
    /// Run aborted with an error
    Failed,
}

impl EtlStage {
    /// Stages that do work, in order.
    pub const SEQUENCE: [EtlStage; 5] = [
        Self::Extract,
        Self::Transform,
        Self::Load,
        Self::Validate,
        Self::Analyze,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Extract => "Extracting Source",
            Self::Transform => "Transforming Data",
            Self::Load => "Loading Table",
            Self::Validate => "Validating Load",
            Self::Analyze => "Analyzing Table",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Overall progress at the start of this stage (0.0 - 1.0).
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => {
                let idx = Self::SEQUENCE.iter().position(|s| s == stage).unwrap_or(0);
                idx as f32 / Self::SEQUENCE.len() as f32
            }
        }
    }
}

/// Progress update emitted during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: EtlStage,
    /// Overall progress (0.0 - 1.0)
    pub progress: f32,
    pub message: String,
}

impl ProgressUpdate {
    /// Update for the start of `stage`.
    pub fn started(stage: EtlStage) -> Self {
        Self {
            stage,
            progress: stage.base_progress(),
            message: format!("{}...", stage.display_name()),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: EtlStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: EtlStage::Failed,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receiver of progress updates.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
