// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and hands a plain
// ExperimentConfig to Layer 2. Running with no arguments
// reproduces the reference protocol: all four experiments,
// 5 epochs, batch size 128, runs tracked under ./mlruns.
//
// Reference: Rust Book §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::RunArgs;

use crate::application::experiment_use_case::{ExperimentConfig, ExperimentUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "mnist-experiments",
    version,
    about = "Train MNIST classifiers with different regularization and optimizers, tracked in MLflow."
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config: ExperimentConfig = self.run.into();
        tracing::info!("Experiment configuration: {:?}", config);

        let summaries = ExperimentUseCase::new(config).execute()?;
        for s in &summaries {
            tracing::info!(
                "{}: test_accuracy={:.4}, final_val_accuracy={:.4}",
                s.run_name,
                s.test_accuracy,
                s.final_val_accuracy,
            );
        }
        Ok(())
    }
}
