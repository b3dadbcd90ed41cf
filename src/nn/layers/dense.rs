use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use crate::nn::act_func::ActFunc;
use crate::nn::error::LayerError;

/// A fully connected layer.
///
/// Every node holds one weight per input element plus a bias. The layer
/// records its latest input, output and error so backpropagation and
/// optimization can run without the caller re-supplying intermediate data.
#[derive(Debug)]
pub struct DenseLayer {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    output: Vec<f64>,
    error: Vec<f64>,
    input: Vec<f64>,
    input_gradients: Vec<f64>,
    act_func: ActFunc,
}

impl DenseLayer {
    /// Creates a new dense layer with randomized parameters.
    ///
    /// `node_count` and `weight_count` must both be greater than zero;
    /// the shape is immutable afterwards.
    pub fn new(
        node_count: usize,
        weight_count: usize,
        act_func: ActFunc,
    ) -> Result<Self, LayerError> {
        let mut rng = StdRng::from_entropy();
        Self::with_rng(node_count, weight_count, act_func, &mut rng)
    }

    /// Creates a new dense layer drawing its start parameters from the
    /// given generator. Seed the generator for deterministic tests.
    pub fn with_rng(
        node_count: usize,
        weight_count: usize,
        act_func: ActFunc,
        rng: &mut StdRng,
    ) -> Result<Self, LayerError> {
        if node_count == 0 || weight_count == 0 {
            return Err(LayerError::ZeroSize);
        }

        let uniform = Uniform::new_inclusive(-0.5, 0.5);
        let weights = (0..node_count)
            .map(|_| (0..weight_count).map(|_| uniform.sample(rng)).collect())
            .collect();
        let bias = (0..node_count).map(|_| uniform.sample(rng)).collect();

        Ok(Self {
            weights,
            bias,
            output: vec![0.0; node_count],
            error: vec![0.0; node_count],
            input: vec![0.0; weight_count],
            input_gradients: vec![0.0; weight_count],
            act_func,
        })
    }

    /// Number of nodes in the layer.
    pub fn node_count(&self) -> usize {
        self.output.len()
    }

    /// Number of weights per node.
    pub fn weight_count(&self) -> usize {
        self.input.len()
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn error(&self) -> &[f64] {
        &self.error
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Input recorded by the latest feedforward call.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Gradient of the loss with respect to the layer input, filled in by
    /// both backpropagation modes. A preceding layer consumes this as its
    /// output gradient.
    pub fn input_gradients(&self) -> &[f64] {
        &self.input_gradients
    }

    /// Replaces all weights at once. The outer length must equal the node
    /// count and every row must hold one weight per input element.
    pub fn set_weights(&mut self, weights: Vec<Vec<f64>>) -> Result<(), LayerError> {
        if weights.len() != self.node_count() {
            return Err(LayerError::DimensionMismatch {
                expected: self.node_count(),
                actual: weights.len(),
            });
        }
        if let Some(row) = weights.iter().find(|row| row.len() != self.weight_count()) {
            return Err(LayerError::DimensionMismatch {
                expected: self.weight_count(),
                actual: row.len(),
            });
        }

        self.weights = weights;
        Ok(())
    }

    /// Replaces the bias vector. Length must equal the node count.
    pub fn set_bias(&mut self, bias: Vec<f64>) -> Result<(), LayerError> {
        if bias.len() != self.node_count() {
            return Err(LayerError::DimensionMismatch {
                expected: self.node_count(),
                actual: bias.len(),
            });
        }

        self.bias = bias;
        Ok(())
    }

    /// Computes output = act(Σ weight·input + bias) for every node and
    /// records the input for the later optimization step.
    pub fn feedforward(&mut self, input: &[f64]) -> Result<(), LayerError> {
        if input.len() != self.weight_count() {
            return Err(LayerError::DimensionMismatch {
                expected: self.weight_count(),
                actual: input.len(),
            });
        }

        for node in 0..self.node_count() {
            let sum: f64 = self.weights[node]
                .iter()
                .zip(input)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + self.bias[node];

            self.output[node] = self.act_func.output(sum);
        }
        self.input.copy_from_slice(input);
        Ok(())
    }

    /// Output-layer backpropagation against reference values.
    ///
    /// error[i] = (output[i] - reference[i]) · act'(output[i])
    pub fn backpropagate(&mut self, reference: &[f64]) -> Result<(), LayerError> {
        if reference.len() != self.node_count() {
            return Err(LayerError::DimensionMismatch {
                expected: self.node_count(),
                actual: reference.len(),
            });
        }

        for node in 0..self.node_count() {
            let output = self.output[node];
            self.error[node] = (output - reference[node]) * self.act_func.delta(output);
        }
        self.compute_input_gradients();
        Ok(())
    }

    /// Hidden-layer backpropagation through the next layer's weights and
    /// already-computed errors (standard chain rule):
    ///
    /// error[i] = act'(output[i]) · Σ_k next.weights[k][i] · next.error[k]
    ///
    /// The next layer's weight count must equal this layer's node count.
    pub fn backpropagate_hidden(&mut self, next_layer: &DenseLayer) -> Result<(), LayerError> {
        if next_layer.weight_count() != self.node_count() {
            return Err(LayerError::DimensionMismatch {
                expected: self.node_count(),
                actual: next_layer.weight_count(),
            });
        }

        for node in 0..self.node_count() {
            let sum: f64 = next_layer
                .weights
                .iter()
                .zip(&next_layer.error)
                .map(|(weights, error)| weights[node] * error)
                .sum();

            self.error[node] = self.act_func.delta(self.output[node]) * sum;
        }
        self.compute_input_gradients();
        Ok(())
    }

    /// One gradient-descent step over the weights and biases.
    ///
    /// The input is normally the one recorded by the latest feedforward
    /// call, available through [`DenseLayer::input`].
    pub fn optimize(&mut self, input: &[f64], learning_rate: f64) -> Result<(), LayerError> {
        if learning_rate <= 0.0 {
            return Err(LayerError::InvalidLearningRate(learning_rate));
        }
        if input.len() != self.weight_count() {
            return Err(LayerError::DimensionMismatch {
                expected: self.weight_count(),
                actual: input.len(),
            });
        }

        for node in 0..self.node_count() {
            let step = learning_rate * self.error[node];
            for (weight, x) in self.weights[node].iter_mut().zip(input) {
                *weight -= step * x;
            }
            self.bias[node] -= step;
        }
        Ok(())
    }

    fn compute_input_gradients(&mut self) {
        for j in 0..self.weight_count() {
            self.input_gradients[j] = self
                .weights
                .iter()
                .zip(&self.error)
                .map(|(weights, error)| weights[j] * error)
                .sum();
        }
    }
}
