//! The ETL pipeline and its builder.
//!
//! [`Pipeline`] binds a [`PipelineConfig`] to a [`TableStore`] and runs the
//! stages one at a time or in sequence.

use crate::analysis::{AnalysisOutcome, Analyzer};
use crate::config::PipelineConfig;
use crate::error::{EtlError, Result};
use crate::extract::{ExtractOutcome, Extractor};
use crate::loader::{LoadOutcome, Loader};
use crate::pipeline::Transformer;
use crate::pipeline::progress::{
    ClosureProgressReporter, EtlStage, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::transformer::TransformSummary;
use crate::store::TableStore;
use crate::validation::{ValidationReport, Validator};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Results of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub extract: ExtractOutcome,
    pub transform: TransformSummary,
    pub load: LoadOutcome,
    /// `None` when the validator could not read its inputs.
    pub validation: Option<ValidationReport>,
    pub analysis: AnalysisOutcome,
    pub duration_ms: u64,
}

/// The churn ETL pipeline.
///
/// Use [`Pipeline::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use churn_etl::{Pipeline, PipelineConfig};
/// use churn_etl::store::InMemoryStore;
/// use std::sync::Arc;
///
/// let summary = Pipeline::builder()
///     .config(PipelineConfig::builder().data_dir("data").build()?)
///     .store(Arc::new(InMemoryStore::new()))
///     .build()?
///     .run()?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    store: Arc<dyn TableStore>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn TableStore {
        self.store.as_ref()
    }

    /// Copy the source file into raw staging.
    pub fn extract(&self) -> Result<ExtractOutcome> {
        Extractor::extract(
            &self.config.source_file,
            &self.config.raw_dir,
            &self.config.raw_file_name,
        )
    }

    /// Transform the raw file into the staged file.
    pub fn transform(&self) -> Result<TransformSummary> {
        Transformer::transform_file(&self.config.raw_path(), &self.config.staged_path())
    }

    /// Insert the staged file into the configured table.
    pub fn load(&self) -> Result<LoadOutcome> {
        Loader::load(&self.config.staged_path(), self.store(), &self.config.table_name)
    }

    /// Compare the loaded table with the staged file.
    pub fn validate(&self) -> Result<ValidationReport> {
        Validator::validate(&self.config.staged_path(), self.store(), &self.config.table_name)
    }

    /// Summarize the loaded table and render charts.
    pub fn analyze(&self) -> Result<AnalysisOutcome> {
        let chart_dir = self
            .config
            .generate_charts
            .then_some(self.config.processed_dir.as_path());
        Analyzer::analyze(
            self.store(),
            &self.config.table_name,
            &self.config.summary_path(),
            chart_dir,
        )
    }

    /// Run every stage in order.
    ///
    /// Extract, transform, load and analyze errors abort the run. A
    /// validator that cannot read its inputs is logged and skipped; failed
    /// checks are part of the report.
    pub fn run(&self) -> Result<RunSummary> {
        match self.run_internal() {
            Ok(summary) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(summary)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        info!("Starting ETL pipeline with {} store...", self.store.name());

        self.enter(EtlStage::Extract);
        let extract = self.extract()?;

        self.enter(EtlStage::Transform);
        let transform = self.transform()?;

        self.enter(EtlStage::Load);
        let load = self.load()?;

        self.enter(EtlStage::Validate);
        let validation = match self.validate() {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Validation could not run: {}", e);
                None
            }
        };

        self.enter(EtlStage::Analyze);
        let analysis = self.analyze()?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("ETL pipeline finished in {} ms", duration_ms);

        Ok(RunSummary {
            extract,
            transform,
            load,
            validation,
            analysis,
            duration_ms,
        })
    }

    fn enter(&self, stage: EtlStage) {
        info!("Stage: {}", stage.display_name());
        self.report_progress(ProgressUpdate::started(stage));
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    store: Option<Arc<dyn TableStore>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`PipelineConfig::default`].
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the table store. Required.
    pub fn store(mut self, store: Arc<dyn TableStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure to receive progress updates.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Configuration`] if no store was set or the
    /// configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self
            .store
            .ok_or_else(|| EtlError::Configuration("No table store configured".to_string()))?;

        Ok(Pipeline {
            config,
            store,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use polars::prelude::*;
    use std::sync::Mutex;

    #[test]
    fn test_build_requires_store() {
        let err = Pipeline::builder().build().err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.table_name = String::new();

        let result = Pipeline::builder()
            .config(config)
            .store(Arc::new(InMemoryStore::new()))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_run_reports_failure_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder()
            .source_file(dir.path().join("missing.csv"))
            .data_dir(dir.path())
            .build()
            .unwrap();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);

        let pipeline = Pipeline::builder()
            .config(config)
            .store(Arc::new(InMemoryStore::new()))
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        let err = pipeline.run().unwrap_err();

        assert_eq!(err.error_code(), "SOURCE_NOT_FOUND");
        assert_eq!(*stages.lock().unwrap(), vec![EtlStage::Extract, EtlStage::Failed]);
    }

    #[test]
    fn test_analyze_without_charts() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder()
            .data_dir(dir.path())
            .generate_charts(false)
            .build()
            .unwrap();
        let store = InMemoryStore::with_table(
            "telco_churn",
            df![
                "churn" => ["Yes"],
                "contract" => ["One year"],
                "monthlycharges" => [50.0],
                "tenure_group" => ["new"],
                "internetservice" => ["DSL"],
            ]
            .unwrap(),
        );

        let pipeline = Pipeline::builder().config(config).store(Arc::new(store)).build().unwrap();
        let outcome = pipeline.analyze().unwrap();

        assert!(outcome.charts.is_empty());
        assert!(outcome.summary_path.is_file());
    }
}
