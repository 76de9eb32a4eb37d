// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// Every flag defaults to the reference protocol's constant.
// The application layer never sees clap types: RunArgs is
// converted into ExperimentConfig at the boundary.

use clap::{Args, ValueEnum};

use crate::application::experiment_use_case::ExperimentConfig;
use crate::application::plan::ExperimentKind;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentArg {
    /// 1: no regularization
    Baseline,
    /// 2: L2 + dropout
    Regularized,
    /// 3: SGD with momentum vs RMSprop vs Adam
    Optimizers,
    /// 4: L2 + dropout + batch normalization
    BatchNorm,
}

impl From<ExperimentArg> for ExperimentKind {
    fn from(arg: ExperimentArg) -> Self {
        match arg {
            ExperimentArg::Baseline    => ExperimentKind::Baseline,
            ExperimentArg::Regularized => ExperimentKind::Regularized,
            ExperimentArg::Optimizers  => ExperimentKind::Optimizers,
            ExperimentArg::BatchNorm   => ExperimentKind::BatchNorm,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// MLflow tracking location (a directory or a file: URI)
    #[arg(long, env = "MLFLOW_TRACKING_URI", default_value = "mlruns")]
    pub tracking_dir: String,

    /// Full passes over the training split per run
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Images per weight update
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Training images held out (from the end) for validation
    #[arg(long, default_value_t = 6_000)]
    pub validation_size: usize,

    /// Run only these experiments (repeatable); all four by default
    #[arg(long = "experiment", value_enum)]
    pub experiments: Vec<ExperimentArg>,

    /// Seed weight init, dropout, and shuffling for repeatable runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<RunArgs> for ExperimentConfig {
    fn from(a: RunArgs) -> Self {
        let mut experiments: Vec<ExperimentKind> = if a.experiments.is_empty() {
            ExperimentKind::ALL.to_vec()
        } else {
            a.experiments.into_iter().map(Into::into).collect()
        };
        // Always execute in series order, once each
        experiments.sort_by_key(|k| k.number());
        experiments.dedup();

        ExperimentConfig {
            tracking_dir:    a.tracking_dir,
            epochs:          a.epochs,
            batch_size:      a.batch_size,
            validation_size: a.validation_size,
            experiments,
            seed:            a.seed,
        }
    }
}
