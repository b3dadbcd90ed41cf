pub mod conv;
pub mod dense;
pub mod flatten;
pub mod max_pool;

use crate::math::matrix::SquareMatrix;
use crate::nn::error::LayerError;

use conv::ConvLayer;
use dense::DenseLayer;
use flatten::FlattenLayer;
use max_pool::MaxPoolLayer;

/// Data travelling between layers: dense and flatten layers produce
/// vectors, convolution and pooling layers produce square matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Vector(Vec<f64>),
    Matrix(SquareMatrix),
}

impl Signal {
    pub fn as_ref(&self) -> SignalRef<'_> {
        match self {
            Signal::Vector(v) => SignalRef::Vector(v),
            Signal::Matrix(m) => SignalRef::Matrix(m),
        }
    }
}

impl From<Vec<f64>> for Signal {
    fn from(values: Vec<f64>) -> Self {
        Signal::Vector(values)
    }
}

impl From<SquareMatrix> for Signal {
    fn from(matrix: SquareMatrix) -> Self {
        Signal::Matrix(matrix)
    }
}

/// Borrowed form of [`Signal`], used when chaining one layer's buffers
/// into the next without copying.
#[derive(Debug, Clone, Copy)]
pub enum SignalRef<'a> {
    Vector(&'a [f64]),
    Matrix(&'a SquareMatrix),
}

/// The closed set of layer kinds a sequential network can stack.
///
/// Dispatch is a plain match; the kind set is fixed, so no trait object is
/// needed.
#[derive(Debug)]
pub enum Layer {
    Dense(DenseLayer),
    Conv(ConvLayer),
    MaxPool(MaxPoolLayer),
    Flatten(FlattenLayer),
}

impl Layer {
    /// Feeds the signal forward through the layer. Feeding a vector into a
    /// 2-D layer (or a matrix into a dense layer) is a recoverable error.
    pub fn feedforward(&mut self, input: SignalRef<'_>) -> Result<(), LayerError> {
        match (self, input) {
            (Layer::Dense(layer), SignalRef::Vector(v)) => layer.feedforward(v),
            (Layer::Conv(layer), SignalRef::Matrix(m)) => layer.feedforward(m),
            (Layer::MaxPool(layer), SignalRef::Matrix(m)) => layer.feedforward(m),
            (Layer::Flatten(layer), SignalRef::Matrix(m)) => layer.feedforward(m),
            (Layer::Dense(_), _) => Err(LayerError::InputKind { expected: "vector" }),
            (_, _) => Err(LayerError::InputKind { expected: "matrix" }),
        }
    }

    /// The layer's latest output.
    pub fn output(&self) -> SignalRef<'_> {
        match self {
            Layer::Dense(layer) => SignalRef::Vector(layer.output()),
            Layer::Conv(layer) => SignalRef::Matrix(layer.output()),
            Layer::MaxPool(layer) => SignalRef::Matrix(layer.output()),
            Layer::Flatten(layer) => SignalRef::Vector(layer.output()),
        }
    }

    /// The layer's latest gradient with respect to its input. The
    /// preceding layer consumes this as its output gradient.
    pub fn input_gradient(&self) -> SignalRef<'_> {
        match self {
            Layer::Dense(layer) => SignalRef::Vector(layer.input_gradients()),
            Layer::Conv(layer) => SignalRef::Matrix(layer.input_gradients()),
            Layer::MaxPool(layer) => SignalRef::Matrix(layer.input_gradients()),
            Layer::Flatten(layer) => SignalRef::Matrix(layer.input_gradients()),
        }
    }
}
