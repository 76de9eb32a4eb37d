// ============================================================
// Layer 5 — Optimizer Selection
// ============================================================
// The three update rules compared by the experiments. The
// hyperparameters reproduce the usual framework defaults:
//
//   Adam     lr 1e-3, β1 0.9, β2 0.999, ε 1e-7
//   RMSprop  lr 1e-3, ρ 0.9, ε 1e-7
//   SGD      lr 1e-2, momentum 0.9, no dampening, no Nesterov
//
// Burn's optimizers are distinct types, so the trainer matches
// on OptimizerChoice and instantiates the one it needs.
//
// Reference: Kingma & Ba (2015) Adam
//            Tieleman & Hinton (2012) RMSprop

use burn::optim::{momentum::MomentumConfig, AdamConfig, RmsPropConfig, SgdConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptimizerChoice {
    Adam { learning_rate: f64 },
    RmsProp { learning_rate: f64 },
    SgdMomentum { learning_rate: f64, momentum: f64 },
}

impl OptimizerChoice {
    pub fn adam() -> Self {
        Self::Adam { learning_rate: 1e-3 }
    }

    pub fn rmsprop() -> Self {
        Self::RmsProp { learning_rate: 1e-3 }
    }

    pub fn sgd_momentum(learning_rate: f64, momentum: f64) -> Self {
        Self::SgdMomentum { learning_rate, momentum }
    }

    pub fn learning_rate(&self) -> f64 {
        match *self {
            Self::Adam { learning_rate }
            | Self::RmsProp { learning_rate }
            | Self::SgdMomentum { learning_rate, .. } => learning_rate,
        }
    }

    /// Short name used when no display label is given
    pub fn name(&self) -> &'static str {
        match self {
            Self::Adam { .. }        => "adam",
            Self::RmsProp { .. }     => "rmsprop",
            Self::SgdMomentum { .. } => "sgd",
        }
    }
}

pub(crate) fn adam_config() -> AdamConfig {
    AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-7)
}

pub(crate) fn rmsprop_config() -> RmsPropConfig {
    RmsPropConfig::new()
        .with_alpha(0.9)
        .with_epsilon(1e-7)
}

pub(crate) fn sgd_config(momentum: f64) -> SgdConfig {
    SgdConfig::new().with_momentum(Some(
        MomentumConfig::new()
            .with_momentum(momentum)
            .with_dampening(0.0)
            .with_nesterov(false),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learning_rates() {
        assert_eq!(OptimizerChoice::adam().learning_rate(), 1e-3);
        assert_eq!(OptimizerChoice::rmsprop().learning_rate(), 1e-3);
        assert_eq!(OptimizerChoice::sgd_momentum(0.01, 0.9).learning_rate(), 0.01);
    }

    #[test]
    fn test_names() {
        assert_eq!(OptimizerChoice::adam().name(), "adam");
        assert_eq!(OptimizerChoice::rmsprop().name(), "rmsprop");
        assert_eq!(OptimizerChoice::sgd_momentum(0.01, 0.9).name(), "sgd");
    }

    #[test]
    fn test_sgd_momentum_has_no_dampening() {
        // SgdConfig keeps its fields private; read them back through serde
        let cfg      = serde_json::to_value(sgd_config(0.9)).unwrap();
        let momentum = &cfg["momentum"];
        assert_eq!(momentum["momentum"], 0.9);
        assert_eq!(momentum["dampening"], 0.0);
        assert_eq!(momentum["nesterov"], false);
    }

    #[test]
    fn test_adaptive_optimizers_use_keras_epsilon() {
        let adam = serde_json::to_value(adam_config()).unwrap();
        let rms  = serde_json::to_value(rmsprop_config()).unwrap();
        assert!((adam["epsilon"].as_f64().unwrap() - 1e-7).abs() < 1e-12);
        assert!((rms["alpha"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }
}
