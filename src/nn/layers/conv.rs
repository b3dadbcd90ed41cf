use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use crate::math::matrix::SquareMatrix;
use crate::nn::act_func::ActFunc;
use crate::nn::error::LayerError;

/// Largest supported kernel side length.
const MAX_KERNEL_SIZE: usize = 11;

/// A convolutional layer with a single square kernel.
///
/// The input is zero padded so the output keeps the spatial size of the
/// input ("same" convolution). The kernel starts zeroed and the bias starts
/// at a random value; both are trained through backpropagate + optimize.
#[derive(Debug)]
pub struct ConvLayer {
    input_padded: SquareMatrix,
    input_gradients_padded: SquareMatrix,
    input_gradients: SquareMatrix,
    kernel: SquareMatrix,
    kernel_gradients: SquareMatrix,
    output: SquareMatrix,
    bias: f64,
    bias_gradient: f64,
    pad_offset: usize,
    act_func: ActFunc,
}

impl ConvLayer {
    /// Creates a new convolutional layer.
    ///
    /// `input_size` must be greater than zero, `kernel_size` must lie in
    /// [1, 11] and must not exceed `input_size`. Sizes are immutable after
    /// construction.
    pub fn new(
        input_size: usize,
        kernel_size: usize,
        act_func: ActFunc,
    ) -> Result<Self, LayerError> {
        let mut rng = StdRng::from_entropy();
        Self::with_rng(input_size, kernel_size, act_func, &mut rng)
    }

    /// Creates a new convolutional layer drawing its start bias from the
    /// given generator. Seed the generator for deterministic tests.
    pub fn with_rng(
        input_size: usize,
        kernel_size: usize,
        act_func: ActFunc,
        rng: &mut StdRng,
    ) -> Result<Self, LayerError> {
        if input_size == 0 {
            return Err(LayerError::ZeroSize);
        }
        if kernel_size == 0 || kernel_size > MAX_KERNEL_SIZE {
            return Err(LayerError::KernelOutOfRange {
                kernel: kernel_size,
                max: MAX_KERNEL_SIZE,
            });
        }
        if kernel_size > input_size {
            return Err(LayerError::KernelExceedsInput {
                kernel: kernel_size,
                input: input_size,
            });
        }

        let pad_offset = kernel_size / 2;
        let padded_size = input_size + 2 * pad_offset;
        let bias = Uniform::new(0.0, 1.0).sample(rng);

        Ok(Self {
            input_padded: SquareMatrix::zeroed(padded_size),
            input_gradients_padded: SquareMatrix::zeroed(padded_size),
            input_gradients: SquareMatrix::zeroed(input_size),
            kernel: SquareMatrix::zeroed(kernel_size),
            kernel_gradients: SquareMatrix::zeroed(kernel_size),
            output: SquareMatrix::zeroed(input_size),
            bias,
            bias_gradient: 0.0,
            pad_offset,
            act_func,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_gradients.size()
    }

    /// Output size equals input size, since the padding preserves the
    /// spatial extent.
    pub fn output_size(&self) -> usize {
        self.output.size()
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel.size()
    }

    pub fn output(&self) -> &SquareMatrix {
        &self.output
    }

    pub fn input_gradients(&self) -> &SquareMatrix {
        &self.input_gradients
    }

    pub fn kernel(&self) -> &SquareMatrix {
        &self.kernel
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Replaces the kernel. The side length must match the configured
    /// kernel size.
    pub fn set_kernel(&mut self, kernel: SquareMatrix) -> Result<(), LayerError> {
        if kernel.size() != self.kernel.size() {
            return Err(LayerError::DimensionMismatch {
                expected: self.kernel.size(),
                actual: kernel.size(),
            });
        }

        self.kernel = kernel;
        Ok(())
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    /// Convolves the kernel over the zero-padded input.
    ///
    /// For every output cell:
    /// output[i][j] = act(bias + Σ padded[i+ki][j+kj] · kernel[ki][kj])
    pub fn feedforward(&mut self, input: &SquareMatrix) -> Result<(), LayerError> {
        if input.size() != self.input_size() {
            return Err(LayerError::DimensionMismatch {
                expected: self.input_size(),
                actual: input.size(),
            });
        }

        self.pad_input(input);

        let size = self.output.size();
        let kernel_size = self.kernel.size();
        for i in 0..size {
            for j in 0..size {
                let mut sum = self.bias;
                for ki in 0..kernel_size {
                    for kj in 0..kernel_size {
                        sum += self.input_padded[(i + ki, j + kj)] * self.kernel[(ki, kj)];
                    }
                }
                self.output[(i, j)] = self.act_func.output(sum);
            }
        }
        Ok(())
    }

    /// Accumulates kernel, bias and input gradients from the gradients of
    /// the next layer. The accumulators are reset on every call; nothing
    /// carries over from the previous backpropagation.
    pub fn backpropagate(&mut self, output_gradients: &SquareMatrix) -> Result<(), LayerError> {
        if output_gradients.size() != self.output.size() {
            return Err(LayerError::DimensionMismatch {
                expected: self.output.size(),
                actual: output_gradients.size(),
            });
        }

        self.input_gradients_padded.fill_zero();
        self.input_gradients.fill_zero();
        self.kernel_gradients.fill_zero();
        self.bias_gradient = 0.0;

        let size = self.output.size();
        let kernel_size = self.kernel.size();
        for i in 0..size {
            for j in 0..size {
                let delta = output_gradients[(i, j)] * self.act_func.delta(self.output[(i, j)]);
                self.bias_gradient += delta;

                for ki in 0..kernel_size {
                    for kj in 0..kernel_size {
                        self.kernel_gradients[(ki, kj)] +=
                            self.input_padded[(i + ki, j + kj)] * delta;
                        self.input_gradients_padded[(i + ki, j + kj)] +=
                            self.kernel[(ki, kj)] * delta;
                    }
                }
            }
        }

        self.extract_input_gradients();
        Ok(())
    }

    /// One gradient-descent step over the kernel and the bias.
    /// The learning rate must lie in (0, 1].
    pub fn optimize(&mut self, learning_rate: f64) -> Result<(), LayerError> {
        if learning_rate <= 0.0 || learning_rate > 1.0 {
            return Err(LayerError::InvalidLearningRate(learning_rate));
        }

        self.bias -= self.bias_gradient * learning_rate;

        let kernel_size = self.kernel.size();
        for ki in 0..kernel_size {
            for kj in 0..kernel_size {
                self.kernel[(ki, kj)] -= self.kernel_gradients[(ki, kj)] * learning_rate;
            }
        }
        Ok(())
    }

    /// Copies the input into the padded buffer. The border was zeroed at
    /// construction and is never written, so only the window needs copying.
    fn pad_input(&mut self, input: &SquareMatrix) {
        let offset = self.pad_offset;
        for i in 0..input.size() {
            for j in 0..input.size() {
                self.input_padded[(i + offset, j + offset)] = input[(i, j)];
            }
        }
    }

    /// Strips the pad border off the padded input gradients.
    fn extract_input_gradients(&mut self) {
        let offset = self.pad_offset;
        for i in 0..self.input_gradients.size() {
            for j in 0..self.input_gradients.size() {
                self.input_gradients[(i, j)] = self.input_gradients_padded[(i + offset, j + offset)];
            }
        }
    }
}
