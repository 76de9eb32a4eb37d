// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch training with per-epoch validation, followed by a
// single evaluation on the test split.
//
// Key Burn insight:
//   - Training runs on an AutodiffBackend so loss.backward() works
//   - model.valid() returns the model on B::InnerBackend, where
//     dropout is a no-op and batch norm uses running statistics
//   - argmax(1) returns [batch, 1], so we flatten before .equal()
//
// Training always runs the full epoch count: no early stopping,
// no checkpointing.
//
// Reference: Burn Book §5 (Custom Training Loop)

use std::sync::Arc;

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{
    batcher::DigitBatcher,
    dataset::{DigitDataset, DigitSplit, PreparedData},
};
use crate::infra::metrics::{EpochMetrics, FitHistory};
use crate::ml::model::{Classifier, ClassifierConfig};
use crate::ml::optimizer::{adam_config, rmsprop_config, sgd_config, OptimizerChoice};

/// Backend used outside of tests: NdArray on the CPU by default,
/// WGPU when built with `--features wgpu`.
#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Whether the fit loop prints a progress line per epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Progress,
    Silent,
}

#[derive(Debug, Clone)]
pub struct FitSettings {
    pub epochs:       usize,
    pub batch_size:   usize,
    pub verbosity:    Verbosity,
    /// Seed for the per-epoch shuffle of the training split
    pub shuffle_seed: u64,
}

/// Loss and accuracy over one split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss:     f64,
    pub accuracy: f64,
}

/// Everything a finished run reports.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub history: FitHistory,
    pub test:    Evaluation,
}

impl RunOutcome {
    pub fn test_accuracy(&self) -> f64 {
        self.test.accuracy
    }

    pub fn final_val_accuracy(&self) -> Option<f64> {
        self.history.final_val_accuracy()
    }
}

/// Build a fresh model, train it with the chosen optimizer, and evaluate
/// it on the test split.
pub fn train_and_evaluate<B: AutodiffBackend>(
    model_cfg: &ClassifierConfig,
    optimizer: OptimizerChoice,
    data:      &PreparedData,
    settings:  &FitSettings,
    device:    &B::Device,
) -> Result<RunOutcome> {
    let model: Classifier<B> = model_cfg.init(device);
    let lr     = optimizer.learning_rate();
    let train  = data.train.clone();
    let val    = data.validation.clone();

    tracing::info!(
        "Training {:?} with {} (lr={}) for {} epochs",
        model_cfg.topology(),
        optimizer.name(),
        lr,
        settings.epochs,
    );

    // Burn's optimizers are separate types; each arm monomorphises fit()
    let (model, history) = match optimizer {
        OptimizerChoice::Adam { .. } => {
            let optim = adam_config().init::<B, Classifier<B>>();
            fit(model, optim, lr, train, val, settings, device)?
        }
        OptimizerChoice::RmsProp { .. } => {
            let optim = rmsprop_config().init::<B, Classifier<B>>();
            fit(model, optim, lr, train, val, settings, device)?
        }
        OptimizerChoice::SgdMomentum { momentum, .. } => {
            let optim = sgd_config(momentum).init::<B, Classifier<B>>();
            fit(model, optim, lr, train, val, settings, device)?
        }
    };

    let test = evaluate(&model.valid(), data.test.clone(), settings.batch_size, device);
    if settings.verbosity == Verbosity::Progress {
        println!("Test - loss: {:.4} - accuracy: {:.4}", test.loss, test.accuracy);
    }
    tracing::info!("Test accuracy: {:.4}", test.accuracy);

    Ok(RunOutcome { history, test })
}

/// Train `model` for exactly `settings.epochs` epochs, evaluating the
/// validation split after each one.
pub fn fit<B, O>(
    mut model:     Classifier<B>,
    mut optim:     O,
    learning_rate: f64,
    train:         Arc<DigitSplit>,
    validation:    Arc<DigitSplit>,
    settings:      &FitSettings,
    device:        &B::Device,
) -> Result<(Classifier<B>, FitHistory)>
where
    B: AutodiffBackend,
    O: Optimizer<Classifier<B>, B>,
{
    ensure!(settings.batch_size > 0, "batch size must be positive");
    ensure!(!train.is_empty(), "training split is empty");

    let train_loader = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(settings.batch_size)
        .shuffle(settings.shuffle_seed)
        .num_workers(1)
        .build(DigitDataset::new(train));

    let mut history = FitHistory::new();

    for epoch in 1..=settings.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            seen += batch.targets.dims()[0];

            let logits = model.forward(batch.images);
            correct += count_correct(logits.clone(), batch.targets.clone());

            let loss = model.loss(logits, batch.targets);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(learning_rate, model, grads);
        }

        let train_loss     = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        let train_accuracy = ratio(correct, seen);

        // ── Validation phase (inference mode) ─────────────────────────────────
        let val = evaluate(&model.valid(), validation.clone(), settings.batch_size, device);

        let metrics = EpochMetrics::new(epoch, train_loss, train_accuracy, val.loss, val.accuracy);
        if settings.verbosity == Verbosity::Progress {
            println!("{}", metrics.progress_line(settings.epochs));
        }
        tracing::debug!(
            "Epoch {} done: train_loss={:.4}, val_accuracy={:.4}, gap={:+.4}",
            epoch,
            train_loss,
            val.accuracy,
            metrics.generalization_gap(),
        );
        history.push(metrics);
    }

    Ok((model, history))
}

/// Mean loss and accuracy of `model` over `split`.
///
/// An empty split yields a NaN loss and zero accuracy.
pub fn evaluate<B: Backend>(
    model:      &Classifier<B>,
    split:      Arc<DigitSplit>,
    batch_size: usize,
    device:     &B::Device,
) -> Evaluation {
    let loader = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(batch_size.max(1))
        .num_workers(1)
        .build(DigitDataset::new(split));

    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut seen     = 0usize;

    for batch in loader.iter() {
        seen += batch.targets.dims()[0];

        let logits = model.forward(batch.images);
        correct += count_correct(logits.clone(), batch.targets.clone());
        loss_sum += model.loss(logits, batch.targets).into_scalar().elem::<f64>();
        batches  += 1;
    }

    Evaluation {
        loss:     if batches > 0 { loss_sum / batches as f64 } else { f64::NAN },
        accuracy: ratio(correct, seen),
    }
}

fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1] — squeeze to [batch]
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

fn ratio(correct: usize, total: usize) -> f64 {
    if total > 0 { correct as f64 / total as f64 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::domain::digit::FEATURE_COUNT;

    type TestBackend = Autodiff<NdArray>;

    /// Two visually distinct classes: blank images are 0, bright images are 1.
    fn toy_split(rows: usize) -> DigitSplit {
        let mut features = Vec::with_capacity(rows * FEATURE_COUNT);
        let mut labels   = Vec::with_capacity(rows);
        for i in 0..rows {
            let label = (i % 2) as u8;
            features.extend(std::iter::repeat(f32::from(label)).take(FEATURE_COUNT));
            labels.push(label);
        }
        DigitSplit::new(features, labels).unwrap()
    }

    fn toy_data() -> PreparedData {
        PreparedData::new(toy_split(16), toy_split(6), toy_split(4))
    }

    fn settings(epochs: usize) -> FitSettings {
        FitSettings { epochs, batch_size: 4, verbosity: Verbosity::Silent, shuffle_seed: 7 }
    }

    #[test]
    fn test_history_has_one_entry_per_epoch() {
        let device  = Default::default();
        let outcome = train_and_evaluate::<TestBackend>(
            &ClassifierConfig::with_switches(true, true, false),
            OptimizerChoice::adam(),
            &toy_data(),
            &settings(3),
            &device,
        )
        .unwrap();

        let epochs: Vec<usize> = outcome.history.epochs().iter().map(|m| m.epoch).collect();
        assert_eq!(epochs, vec![1, 2, 3]);

        for m in outcome.history.epochs() {
            assert!((-1.0..=1.0).contains(&m.generalization_gap()));
        }
    }

    #[test]
    fn test_accuracies_are_fractions_for_every_optimizer() {
        let device = Default::default();
        let cfg    = ClassifierConfig::with_switches(true, true, true);

        for optimizer in [
            OptimizerChoice::sgd_momentum(0.01, 0.9),
            OptimizerChoice::rmsprop(),
            OptimizerChoice::adam(),
        ] {
            let outcome = train_and_evaluate::<TestBackend>(
                &cfg, optimizer, &toy_data(), &settings(1), &device,
            )
            .unwrap();

            let test = outcome.test_accuracy();
            let val  = outcome.final_val_accuracy().unwrap();
            assert!((0.0..=1.0).contains(&test), "{} test accuracy {test}", optimizer.name());
            assert!((0.0..=1.0).contains(&val), "{} val accuracy {val}", optimizer.name());
        }
    }

    #[test]
    fn test_adam_learns_trivially_separable_classes() {
        let device  = Default::default();
        let outcome = train_and_evaluate::<TestBackend>(
            &ClassifierConfig::new(),
            OptimizerChoice::adam(),
            &toy_data(),
            &settings(10),
            &device,
        )
        .unwrap();

        assert!(outcome.test_accuracy() >= 0.75, "accuracy {}", outcome.test_accuracy());
    }

    #[test]
    fn test_empty_training_split_is_rejected() {
        let device = Default::default();
        let data   = PreparedData::new(DigitSplit::default(), toy_split(2), toy_split(2));
        let result = train_and_evaluate::<TestBackend>(
            &ClassifierConfig::new(),
            OptimizerChoice::adam(),
            &data,
            &settings(1),
            &device,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluate_empty_split() {
        let device = Default::default();
        let model: Classifier<NdArray> = ClassifierConfig::new().init(&device);
        let eval = evaluate(&model, Arc::new(DigitSplit::default()), 8, &device);
        assert_eq!(eval.accuracy, 0.0);
        assert!(eval.loss.is_nan());
    }
}
