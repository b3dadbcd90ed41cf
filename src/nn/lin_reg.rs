use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::nn::error::NetworkError;

/// Mean absolute epoch error below which training stops early.
const CONVERGENCE_THRESHOLD: f64 = 1e-6;

/// A single-parameter linear regression model: predict(x) = weight·x + bias.
///
/// A degenerate one-layer case of the feedforward/train contract family,
/// trained with shuffled stochastic gradient descent and early stopping.
/// The model borrows its training data; the effective sample count is the
/// minimum of the two slice lengths.
pub struct LinReg<'a> {
    train_input: &'a [f64],
    train_output: &'a [f64],
    train_set_count: usize,
    weight: f64,
    bias: f64,
    rng: StdRng,
}

impl<'a> LinReg<'a> {
    /// Creates a model with both parameters randomized in [0, 1).
    pub fn new(train_input: &'a [f64], train_output: &'a [f64]) -> Self {
        Self::with_rng(train_input, train_output, StdRng::from_entropy())
    }

    /// Like [`LinReg::new`], but with an injected generator so start
    /// parameters and shuffling are deterministic in tests.
    pub fn with_rng(train_input: &'a [f64], train_output: &'a [f64], mut rng: StdRng) -> Self {
        let uniform = Uniform::new(0.0, 1.0);
        let weight = uniform.sample(&mut rng);
        let bias = uniform.sample(&mut rng);

        Self {
            train_input,
            train_output,
            train_set_count: train_input.len().min(train_output.len()),
            weight,
            bias,
            rng,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Number of complete training pairs.
    pub fn train_set_count(&self) -> usize {
        self.train_set_count
    }

    pub fn predict(&self, input: f64) -> f64 {
        self.weight * input + self.bias
    }

    /// Trains with shuffled stochastic gradient descent.
    ///
    /// Every epoch permutes the sample order by repeated random-index
    /// swaps, then per sample nudges bias and weight toward the target.
    /// An input of exactly zero pins the bias directly to the target (the
    /// degenerate closed-form point). Training exits early once the mean
    /// absolute epoch error drops below 1e-6; running all epochs without
    /// converging is still a success.
    pub fn train(&mut self, epoch_count: usize, learning_rate: f64) -> Result<(), NetworkError> {
        if self.train_set_count == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }
        if epoch_count == 0 {
            return Err(NetworkError::ZeroEpochs);
        }
        if learning_rate <= 0.0 {
            return Err(NetworkError::InvalidLearningRate(learning_rate));
        }

        let mut order: Vec<usize> = (0..self.train_set_count).collect();

        for epoch in 0..epoch_count {
            self.shuffle(&mut order);

            let mut total_error = 0.0;
            for &sample in &order {
                let x = self.train_input[sample];
                let reference = self.train_output[sample];

                if x == 0.0 {
                    self.bias = reference;
                } else {
                    let error = reference - self.predict(x);
                    self.bias += error * learning_rate;
                    self.weight += error * learning_rate * x;
                    total_error += error.abs();
                }
            }

            let average_error = total_error / self.train_set_count as f64;
            if average_error < CONVERGENCE_THRESHOLD {
                info!("training converged after {} epochs", epoch + 1);
                return Ok(());
            }
        }
        Ok(())
    }

    /// Permutes the order by swapping every position with a random one.
    fn shuffle(&mut self, order: &mut [usize]) {
        for i in 0..order.len() {
            let r = self.rng.gen_range(0..order.len());
            order.swap(i, r);
        }
    }
}
