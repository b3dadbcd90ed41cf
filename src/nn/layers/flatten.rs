use crate::math::matrix::SquareMatrix;
use crate::nn::error::LayerError;

/// A flatten layer reshaping a square matrix to a row-major vector and
/// routing gradients back through the inverse mapping. No trainable
/// parameters.
#[derive(Debug)]
pub struct FlattenLayer {
    input_gradients: SquareMatrix,
    output: Vec<f64>,
}

impl FlattenLayer {
    /// Creates a new flatten layer; the output length is input_size².
    pub fn new(input_size: usize) -> Result<Self, LayerError> {
        if input_size == 0 {
            return Err(LayerError::ZeroSize);
        }

        Ok(Self {
            input_gradients: SquareMatrix::zeroed(input_size),
            output: vec![0.0; input_size * input_size],
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_gradients.size()
    }

    pub fn output_size(&self) -> usize {
        self.output.len()
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn input_gradients(&self) -> &SquareMatrix {
        &self.input_gradients
    }

    /// Row-major flatten: output[input_size · i + j] = input[i][j].
    pub fn feedforward(&mut self, input: &SquareMatrix) -> Result<(), LayerError> {
        let input_size = self.input_size();
        if input.size() != input_size {
            return Err(LayerError::DimensionMismatch {
                expected: input_size,
                actual: input.size(),
            });
        }

        for i in 0..input_size {
            for j in 0..input_size {
                self.output[input_size * i + j] = input[(i, j)];
            }
        }
        Ok(())
    }

    /// Inverse mapping: input_gradients[i][j] = gradients[input_size · i + j].
    pub fn backpropagate(&mut self, output_gradients: &[f64]) -> Result<(), LayerError> {
        if output_gradients.len() != self.output.len() {
            return Err(LayerError::DimensionMismatch {
                expected: self.output.len(),
                actual: output_gradients.len(),
            });
        }

        let input_size = self.input_size();
        for i in 0..input_size {
            for j in 0..input_size {
                self.input_gradients[(i, j)] = output_gradients[input_size * i + j];
            }
        }
        Ok(())
    }

    /// No trainable parameters; present for interface symmetry.
    pub fn optimize(&mut self, _learning_rate: f64) -> Result<(), LayerError> {
        Ok(())
    }
}
