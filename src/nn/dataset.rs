use crate::nn::layers::{Signal, SignalRef};

/// Parallel collections of input and target samples.
///
/// The effective sample count is the minimum of the two collection lengths;
/// mismatched lengths are truncated rather than rejected, so callers can
/// pass partially filled collections.
#[derive(Debug)]
pub struct Dataset {
    inputs: Vec<Signal>,
    targets: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn new(inputs: Vec<Signal>, targets: Vec<Vec<f64>>) -> Self {
        Self { inputs, targets }
    }

    /// Convenience constructor for the common all-vector case.
    pub fn from_vectors(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Self {
        Self {
            inputs: inputs.into_iter().map(Signal::from).collect(),
            targets,
        }
    }

    /// Number of complete training pairs.
    pub fn sample_count(&self) -> usize {
        self.inputs.len().min(self.targets.len())
    }

    pub fn input(&self, index: usize) -> SignalRef<'_> {
        self.inputs[index].as_ref()
    }

    pub fn target(&self, index: usize) -> &[f64] {
        &self.targets[index]
    }
}
