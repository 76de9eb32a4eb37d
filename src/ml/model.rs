use burn::{
    nn::{
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};
use serde::{Deserialize, Serialize};

/// Output activation of a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Softmax,
}

/// One entry of the classifier's layer stack, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayerSpec {
    Input { size: usize },
    Dense { units: usize, activation: Activation, l2: Option<f64> },
    BatchNorm { features: usize },
    Dropout { rate: f64 },
}

/// Layers inserted between the hidden and output layers when enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionalLayer {
    BatchNorm,
    Dropout(f64),
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    #[config(default = false)]
    pub use_l2: bool,
    #[config(default = false)]
    pub use_dropout: bool,
    #[config(default = false)]
    pub use_batch_norm: bool,
    #[config(default = 784)]
    pub input_size: usize,
    #[config(default = 512)]
    pub hidden_size: usize,
    #[config(default = 10)]
    pub num_classes: usize,
    #[config(default = 0.001)]
    pub l2_factor: f64,
    #[config(default = 0.2)]
    pub dropout: f64,
}

impl ClassifierConfig {
    /// The model factory's three switches, everything else at its default.
    pub fn with_switches(use_l2: bool, use_dropout: bool, use_batch_norm: bool) -> Self {
        Self::new()
            .with_use_l2(use_l2)
            .with_use_dropout(use_dropout)
            .with_use_batch_norm(use_batch_norm)
    }

    /// Enabled optional layers in the fixed order they are applied:
    /// normalization always precedes dropout.
    pub fn optional_layers(&self) -> Vec<OptionalLayer> {
        [
            (self.use_batch_norm, OptionalLayer::BatchNorm),
            (self.use_dropout,    OptionalLayer::Dropout(self.dropout)),
        ]
        .into_iter()
        .filter_map(|(enabled, layer)| enabled.then_some(layer))
        .collect()
    }

    /// Full layer stack described by this configuration.
    pub fn topology(&self) -> Vec<LayerSpec> {
        let mut layers = vec![
            LayerSpec::Input { size: self.input_size },
            LayerSpec::Dense {
                units:      self.hidden_size,
                activation: Activation::Relu,
                l2:         self.use_l2.then_some(self.l2_factor),
            },
        ];
        layers.extend(self.optional_layers().into_iter().map(|layer| match layer {
            OptionalLayer::BatchNorm     => LayerSpec::BatchNorm { features: self.hidden_size },
            OptionalLayer::Dropout(rate) => LayerSpec::Dropout { rate },
        }));
        layers.push(LayerSpec::Dense {
            units:      self.num_classes,
            activation: Activation::Softmax,
            l2:         None,
        });
        layers
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        let mut norm    = None;
        let mut dropout = None;
        for layer in self.optional_layers() {
            match layer {
                OptionalLayer::BatchNorm => {
                    norm = Some(BatchNormConfig::new(self.hidden_size).init(device));
                }
                OptionalLayer::Dropout(rate) => {
                    dropout = Some(DropoutConfig::new(rate).init());
                }
            }
        }

        Classifier {
            hidden:    LinearConfig::new(self.input_size, self.hidden_size).init(device),
            norm,
            dropout,
            output:    LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            l2_factor: if self.use_l2 { self.l2_factor } else { 0.0 },
        }
    }
}

#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub hidden:    Linear<B>,
    pub norm:      Option<BatchNorm<B, 0>>,
    pub dropout:   Option<Dropout>,
    pub output:    Linear<B>,
    pub l2_factor: f64,
}

impl<B: Backend> Classifier<B> {
    /// images: [batch, 784] → logits: [batch, 10]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = activation::relu(self.hidden.forward(images));
        let x = match &self.norm {
            Some(norm) => norm.forward(x),
            None       => x,
        };
        let x = match &self.dropout {
            Some(dropout) => dropout.forward(x),
            None          => x,
        };
        self.output.forward(x)
    }

    /// Class probabilities; each row sums to 1.
    pub fn predict_proba(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::softmax(self.forward(images), 1)
    }

    /// Cross-entropy on the logits plus the L2 penalty
    /// `l2_factor * Σ W²` over the hidden kernel.
    pub fn loss(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let ce = burn::nn::loss::CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets);

        if self.l2_factor > 0.0 {
            ce + self.l2_penalty()
        } else {
            ce
        }
    }

    pub fn l2_penalty(&self) -> Tensor<B, 1> {
        self.hidden
            .weight
            .val()
            .powf_scalar(2.0)
            .sum()
            .mul_scalar(self.l2_factor)
    }

    /// Width of the output layer
    pub fn num_classes(&self) -> usize {
        self.output.weight.val().dims()[1]
    }
}
