use crate::math::matrix::SquareMatrix;
use crate::nn::error::LayerError;

/// A max-pooling layer reducing non-overlapping square windows to their
/// maximum. The layer has no trainable parameters; it caches its raw input
/// so backpropagation can relocate each window's maximum.
#[derive(Debug)]
pub struct MaxPoolLayer {
    input: SquareMatrix,
    input_gradients: SquareMatrix,
    output: SquareMatrix,
    pool_size: usize,
}

impl MaxPoolLayer {
    /// Creates a new max-pooling layer. The input size must be a positive
    /// multiple of the pool size.
    pub fn new(input_size: usize, pool_size: usize) -> Result<Self, LayerError> {
        if input_size == 0 || pool_size == 0 {
            return Err(LayerError::ZeroSize);
        }
        if input_size % pool_size != 0 {
            return Err(LayerError::IndivisiblePool {
                input: input_size,
                pool: pool_size,
            });
        }

        Ok(Self {
            input: SquareMatrix::zeroed(input_size),
            input_gradients: SquareMatrix::zeroed(input_size),
            output: SquareMatrix::zeroed(input_size / pool_size),
            pool_size,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input.size()
    }

    pub fn output_size(&self) -> usize {
        self.output.size()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn output(&self) -> &SquareMatrix {
        &self.output
    }

    pub fn input_gradients(&self) -> &SquareMatrix {
        &self.input_gradients
    }

    /// Takes the maximum of every pool window and caches the raw input for
    /// the subsequent backpropagation.
    pub fn feedforward(&mut self, input: &SquareMatrix) -> Result<(), LayerError> {
        if input.size() != self.input.size() {
            return Err(LayerError::DimensionMismatch {
                expected: self.input.size(),
                actual: input.size(),
            });
        }

        for i in 0..self.output.size() {
            for j in 0..self.output.size() {
                let mut max = f64::MIN;
                for pi in 0..self.pool_size {
                    for pj in 0..self.pool_size {
                        let value = input[(i * self.pool_size + pi, j * self.pool_size + pj)];
                        if value > max {
                            max = value;
                        }
                    }
                }
                self.output[(i, j)] = max;
            }
        }
        self.input = input.clone();
        Ok(())
    }

    /// Routes each output gradient exclusively to the cell that produced
    /// the pooled maximum; every other position in the window stays zero.
    /// Ties resolve to the first matching cell in row-major order.
    pub fn backpropagate(&mut self, output_gradients: &SquareMatrix) -> Result<(), LayerError> {
        if output_gradients.size() != self.output.size() {
            return Err(LayerError::DimensionMismatch {
                expected: self.output.size(),
                actual: output_gradients.size(),
            });
        }

        self.input_gradients.fill_zero();

        for i in 0..self.output.size() {
            for j in 0..self.output.size() {
                let max = self.output[(i, j)];

                'window: for pi in 0..self.pool_size {
                    for pj in 0..self.pool_size {
                        let row = i * self.pool_size + pi;
                        let column = j * self.pool_size + pj;
                        if self.input[(row, column)] == max {
                            self.input_gradients[(row, column)] = output_gradients[(i, j)];
                            break 'window;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// No trainable parameters; always succeeds.
    pub fn optimize(&mut self, _learning_rate: f64) -> Result<(), LayerError> {
        Ok(())
    }
}
