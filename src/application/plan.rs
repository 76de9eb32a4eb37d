// ============================================================
// Layer 2 — Experiment Plan
// ============================================================
// The fixed series of experiments and the training runs each
// one performs. Every run trains a fresh model for the same
// epoch count and batch size; only the model switches and the
// optimizer change.
//
//   1. Baseline            no regularization, adam
//   2. Regularized         L2 + dropout, adam
//   3. Optimizers          L2 + dropout, SGD+momentum / RMSprop / Adam
//   4. Batch norm          L2 + dropout + batch norm, adam

use serde::Serialize;

use crate::domain::run::RunParams;
use crate::ml::model::ClassifierConfig;
use crate::ml::optimizer::OptimizerChoice;
use crate::ml::trainer::Verbosity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExperimentKind {
    Baseline,
    Regularized,
    Optimizers,
    BatchNorm,
}

impl ExperimentKind {
    /// Every experiment, in execution order
    pub const ALL: [ExperimentKind; 4] = [
        ExperimentKind::Baseline,
        ExperimentKind::Regularized,
        ExperimentKind::Optimizers,
        ExperimentKind::BatchNorm,
    ];

    pub fn number(self) -> usize {
        match self {
            ExperimentKind::Baseline    => 1,
            ExperimentKind::Regularized => 2,
            ExperimentKind::Optimizers  => 3,
            ExperimentKind::BatchNorm   => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ExperimentKind::Baseline    => "Modèle de base",
            ExperimentKind::Regularized => "Modèle avec Régularisation",
            ExperimentKind::Optimizers  => "Comparaison des Optimiseurs",
            ExperimentKind::BatchNorm   => "Modèle avec Batch Normalization",
        }
    }

    /// Banner printed when the experiment starts
    pub fn announcement(self) -> String {
        format!("\n--- Démarrage de l'expérience {}: {} ---", self.number(), self.title())
    }
}

/// One training run: what to build, how to train it, what to record.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub run_name:  String,
    pub model:     ClassifierConfig,
    pub optimizer: OptimizerChoice,
    pub params:    RunParams,
    pub verbosity: Verbosity,
}

impl RunSpec {
    /// Silent runs report their optimizer and final test accuracy instead
    /// of per-epoch progress.
    pub fn reports_optimizer(&self) -> bool {
        self.verbosity == Verbosity::Silent
    }
}

#[derive(Debug, Clone)]
pub struct Experiment {
    pub kind: ExperimentKind,
    pub runs: Vec<RunSpec>,
}

/// Build the runs of one experiment.
pub fn experiment(kind: ExperimentKind) -> Experiment {
    let regularized = || ClassifierConfig::with_switches(true, true, false);

    let runs = match kind {
        ExperimentKind::Baseline => vec![RunSpec {
            run_name:  "Base_Model_Bias_Variance".to_string(),
            model:     ClassifierConfig::with_switches(false, false, false),
            optimizer: OptimizerChoice::adam(),
            params:    RunParams::new("none", false, "adam"),
            verbosity: Verbosity::Progress,
        }],
        ExperimentKind::Regularized => vec![RunSpec {
            run_name:  "Regularized_Model".to_string(),
            model:     regularized(),
            optimizer: OptimizerChoice::adam(),
            params:    RunParams::new("L2+Dropout", false, "adam"),
            verbosity: Verbosity::Progress,
        }],
        ExperimentKind::Optimizers => [
            ("SGD_with_momentum", OptimizerChoice::sgd_momentum(0.01, 0.9)),
            ("RMSprop",           OptimizerChoice::rmsprop()),
            ("Adam",              OptimizerChoice::adam()),
        ]
        .into_iter()
        .map(|(name, optimizer)| RunSpec {
            run_name:  format!("Optimizer_Comparison_{name}"),
            model:     regularized(),
            optimizer,
            params:    RunParams::new("L2+Dropout", false, name),
            verbosity: Verbosity::Silent,
        })
        .collect(),
        ExperimentKind::BatchNorm => vec![RunSpec {
            run_name:  "Model_With_Batch_Norm".to_string(),
            model:     ClassifierConfig::with_switches(true, true, true),
            optimizer: OptimizerChoice::adam(),
            params:    RunParams::new("L2+Dropout", true, "adam"),
            verbosity: Verbosity::Progress,
        }],
    };

    Experiment { kind, runs }
}
