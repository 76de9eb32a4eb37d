// ============================================================
// Layer 2 — ExperimentUseCase
// ============================================================
// Runs the experiment series end to end:
//
//   Step 1: Load MNIST                 (Layer 4 - data)
//   Step 2: Normalise, flatten, split  (Layer 4 - data)
//   Step 3: Open the tracking store    (Layer 6 - infra)
//   Step 4: For each experiment, for each run:
//             start run → train → evaluate on test
//             → log params + metrics → end run
//                                      (Layer 5 - ml, Layer 6 - infra)
//
// Everything is sequential. The first error marks the current
// run as failed in the store and aborts the whole series.

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::Serialize;

use crate::application::plan::{experiment, ExperimentKind, RunSpec};
use crate::data::{
    dataset::PreparedData,
    loader::MnistLoader,
    preprocessor::{Preprocessor, DEFAULT_VALIDATION_SIZE},
};
use crate::domain::run::{RunStatus, FINAL_VAL_ACCURACY, TEST_ACCURACY};
use crate::domain::traits::{DigitSource, RunTracker};
use crate::infra::tracking::{tracking_dir_from_uri, MlflowFileStore};
use crate::ml::trainer::{train_and_evaluate, FitSettings, TrainBackend};

const MODEL_CONFIG_ARTIFACT:      &str = "model_config.json";
const EXPERIMENT_CONFIG_ARTIFACT: &str = "experiment_config.json";

// ─── Experiment Configuration ────────────────────────────────────────────────
// Defaults reproduce the reference protocol: 5 epochs, batch size
// 128, 6,000 validation images, all four experiments, no seed.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentConfig {
    pub tracking_dir:    String,
    pub epochs:          usize,
    pub batch_size:      usize,
    pub validation_size: usize,
    pub experiments:     Vec<ExperimentKind>,
    pub seed:            Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            tracking_dir:    "mlruns".to_string(),
            epochs:          5,
            batch_size:      128,
            validation_size: DEFAULT_VALIDATION_SIZE,
            experiments:     ExperimentKind::ALL.to_vec(),
            seed:            None,
        }
    }
}

/// What one finished run reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_name:           String,
    pub test_accuracy:      f64,
    pub final_val_accuracy: f64,
}

pub struct ExperimentUseCase {
    config: ExperimentConfig,
}

impl ExperimentUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Load MNIST, track into the configured MLflow directory, and run
    /// every selected experiment.
    pub fn execute(&self) -> Result<Vec<RunSummary>> {
        let cfg = &self.config;
        // Reject remote tracking URIs before spending time on the download
        let tracking_dir = tracking_dir_from_uri(&cfg.tracking_dir)?;

        // ── Steps 1-2: data ───────────────────────────────────────────────────
        let corpus = MnistLoader::new().load()?;
        let data   = Preprocessor::new(cfg.validation_size).prepare(corpus)?;

        // ── Step 3: tracking store ────────────────────────────────────────────
        let mut store = MlflowFileStore::open(tracking_dir)?;
        tracing::info!("Tracking runs in '{}'", store.root().display());

        // ── Step 4: experiments ───────────────────────────────────────────────
        let device    = Default::default();
        let summaries = self.run::<TrainBackend, _>(&data, &mut store, &device)?;

        println!("\nToutes les expériences sont terminées. Lancez 'mlflow ui' pour voir les résultats.");
        Ok(summaries)
    }

    /// Run the selected experiments on already prepared data.
    pub fn run<B, T>(&self, data: &PreparedData, tracker: &mut T, device: &B::Device) -> Result<Vec<RunSummary>>
    where
        B: AutodiffBackend,
        T: RunTracker,
    {
        if let Some(seed) = self.config.seed {
            B::seed(seed);
            tracing::info!("Backend seeded with {}", seed);
        }

        let mut summaries = Vec::new();
        for &kind in &self.config.experiments {
            println!("{}", kind.announcement());

            for spec in experiment(kind).runs {
                let summary = self.tracked_run::<B, T>(&spec, data, tracker, device)?;
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }

    /// Open a run, train inside it, and close it as finished or failed.
    fn tracked_run<B, T>(
        &self,
        spec:    &RunSpec,
        data:    &PreparedData,
        tracker: &mut T,
        device:  &B::Device,
    ) -> Result<RunSummary>
    where
        B: AutodiffBackend,
        T: RunTracker,
    {
        let run_id = tracker.start_run(&spec.run_name)?;

        match self.train_run::<B, T>(spec, data, tracker, &run_id, device) {
            Ok(summary) => {
                tracker.end_run(&run_id, RunStatus::Finished)?;
                Ok(summary)
            }
            Err(err) => {
                if let Err(end_err) = tracker.end_run(&run_id, RunStatus::Failed) {
                    tracing::warn!("Could not mark run {} as failed: {:#}", run_id, end_err);
                }
                Err(err.context(format!("run '{}' failed", spec.run_name)))
            }
        }
    }

    fn train_run<B, T>(
        &self,
        spec:    &RunSpec,
        data:    &PreparedData,
        tracker: &mut T,
        run_id:  &str,
        device:  &B::Device,
    ) -> Result<RunSummary>
    where
        B: AutodiffBackend,
        T: RunTracker,
    {
        let label = &spec.params.optimizer;
        if spec.reports_optimizer() {
            println!("  Entraînement avec l'optimiseur : {label}");
        }

        let shuffle_seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!("Run '{}': shuffle seed {}", spec.run_name, shuffle_seed);

        let settings = FitSettings {
            epochs:     self.config.epochs,
            batch_size: self.config.batch_size,
            verbosity:  spec.verbosity,
            shuffle_seed,
        };

        tracker.log_text(run_id, MODEL_CONFIG_ARTIFACT, &serde_json::to_string_pretty(&spec.model)?)?;
        tracker.log_text(run_id, EXPERIMENT_CONFIG_ARTIFACT, &serde_json::to_string_pretty(&self.config)?)?;

        let outcome = train_and_evaluate::<B>(&spec.model, spec.optimizer, data, &settings, device)?;

        let test_accuracy      = outcome.test_accuracy();
        let final_val_accuracy = outcome
            .final_val_accuracy()
            .context("no epoch completed, so there is no validation accuracy to record")?;

        if spec.reports_optimizer() {
            println!("  Accuracy finale pour {label}: {test_accuracy:.4}");
        }

        for (key, value) in spec.params.pairs() {
            tracker.log_param(run_id, key, &value)?;
        }
        tracker.log_metric(run_id, TEST_ACCURACY, test_accuracy)?;
        tracker.log_metric(run_id, FINAL_VAL_ACCURACY, final_val_accuracy)?;

        Ok(RunSummary {
            run_name: spec.run_name.clone(),
            test_accuracy,
            final_val_accuracy,
        })
    }
}
