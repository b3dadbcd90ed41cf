use thiserror::Error;

/// Failures reported by the individual layers.
///
/// Construction-time shape violations are unrecoverable for the instance
/// (sizes are immutable after construction), call-time violations leave the
/// layer completely untouched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LayerError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("layer size must be greater than zero")]
    ZeroSize,

    #[error("kernel size {kernel} is outside range [1, {max}]")]
    KernelOutOfRange { kernel: usize, max: usize },

    #[error("kernel size {kernel} cannot be greater than input size {input}")]
    KernelExceedsInput { kernel: usize, input: usize },

    #[error("input size {input} is not divisible by pool size {pool}")]
    IndivisiblePool { input: usize, pool: usize },

    #[error("learning rate {0} is out of range")]
    InvalidLearningRate(f64),

    #[error("layer expects a {expected} input")]
    InputKind { expected: &'static str },
}

/// Failures reported by the network orchestrator and the regression model.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NetworkError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("epoch count must be greater than zero")]
    ZeroEpochs,

    #[error("learning rate {0} must be greater than zero")]
    InvalidLearningRate(f64),

    #[error("a network needs at least two layers")]
    TooFewLayers,

    #[error("the final layer must produce a vector output")]
    NonVectorOutput,

    #[error("adjacent layers produce and consume different signal kinds")]
    IncompatibleLayers,

    #[error("prediction length {predicted} does not match reference length {reference}")]
    ReferenceMismatch { predicted: usize, reference: usize },

    #[error(transparent)]
    Layer(#[from] LayerError),
}
