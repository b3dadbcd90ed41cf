use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::nn::dataset::Dataset;
use crate::nn::error::NetworkError;
use crate::nn::layers::{Layer, SignalRef};

/// A sequential network driving an ordered stack of at least two layers.
///
/// Feedforward chains each layer's output into the next layer's input;
/// backpropagation chains each layer's input gradient into the previous
/// layer; optimization applies one gradient-descent step per layer using
/// its own recorded input. The network owns its layers and borrows the
/// training set, holding no duplicate copy of the data.
#[derive(Debug)]
pub struct Network<'a> {
    layers: Vec<Layer>,
    dataset: &'a Dataset,
    rng: StdRng,
}

impl<'a> Network<'a> {
    /// Creates a network over the given layer stack and training set.
    /// Fails with fewer than two layers.
    pub fn new(layers: Vec<Layer>, dataset: &'a Dataset) -> Result<Self, NetworkError> {
        Self::with_rng(layers, dataset, StdRng::from_entropy())
    }

    /// Like [`Network::new`], but with an injected generator so the sample
    /// shuffling is deterministic in tests.
    pub fn with_rng(
        layers: Vec<Layer>,
        dataset: &'a Dataset,
        rng: StdRng,
    ) -> Result<Self, NetworkError> {
        if layers.len() < 2 {
            return Err(NetworkError::TooFewLayers);
        }

        Ok(Self {
            layers,
            dataset,
            rng,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Feeds the input through every layer in order and returns the final
    /// layer's output. The final layer must produce a vector.
    pub fn predict(&mut self, input: SignalRef<'_>) -> Result<&[f64], NetworkError> {
        feedforward_stack(&mut self.layers, input)?;
        last_vector_output(&self.layers)
    }

    /// Runs epoch-based stochastic training over the training set and
    /// returns the resulting [`Network::accuracy`].
    ///
    /// Every epoch shuffles the sample order, then per sample feeds
    /// forward through all layers, backpropagates from the last layer back
    /// through each predecessor and optimizes every layer. A failing layer
    /// call aborts the run instead of continuing with stale state.
    pub fn train(&mut self, epoch_count: usize, learning_rate: f64) -> Result<f64, NetworkError> {
        let sample_count = self.dataset.sample_count();
        if sample_count == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }
        if epoch_count == 0 {
            return Err(NetworkError::ZeroEpochs);
        }
        if learning_rate <= 0.0 {
            return Err(NetworkError::InvalidLearningRate(learning_rate));
        }

        let mut order: Vec<usize> = (0..sample_count).collect();
        for epoch in 0..epoch_count {
            order.shuffle(&mut self.rng);

            for &sample in &order {
                feedforward_stack(&mut self.layers, self.dataset.input(sample))?;
                backpropagate_stack(&mut self.layers, self.dataset.target(sample))?;
                optimize_stack(&mut self.layers, learning_rate)?;
            }
            debug!("epoch {}/{} complete", epoch + 1, epoch_count);
        }

        let accuracy = self.accuracy()?;
        info!("training finished after {epoch_count} epochs, accuracy {accuracy:.4}");
        Ok(accuracy)
    }

    /// 1 minus the mean absolute prediction error over the training set,
    /// clamped below at zero so the score stays in [0, 1].
    ///
    /// Replaying the predictions overwrites each layer's cached buffers
    /// but leaves all parameters untouched.
    pub fn accuracy(&mut self) -> Result<f64, NetworkError> {
        let sample_count = self.dataset.sample_count();
        if sample_count == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }

        let mut total_deviation = 0.0;
        for sample in 0..sample_count {
            feedforward_stack(&mut self.layers, self.dataset.input(sample))?;
            let prediction = last_vector_output(&self.layers)?;
            total_deviation += mean_abs_deviation(prediction, self.dataset.target(sample))?;
        }

        Ok((1.0 - total_deviation / sample_count as f64).max(0.0))
    }

    /// Predicts on the given input and returns the mean absolute
    /// component-wise deviation from the reference values.
    pub fn average_error(
        &mut self,
        input: SignalRef<'_>,
        reference: &[f64],
    ) -> Result<f64, NetworkError> {
        feedforward_stack(&mut self.layers, input)?;
        let prediction = last_vector_output(&self.layers)?;
        mean_abs_deviation(prediction, reference)
    }
}

/// Chains feedforward through the stack, each layer consuming the
/// preceding layer's output.
fn feedforward_stack(layers: &mut [Layer], input: SignalRef<'_>) -> Result<(), NetworkError> {
    for i in 0..layers.len() {
        if i == 0 {
            layers[0].feedforward(input)?;
        } else {
            let (prev, rest) = layers.split_at_mut(i);
            let signal = prev[i - 1].output();
            rest[0].feedforward(signal)?;
        }
    }
    Ok(())
}

/// Chains backpropagation from the last layer to the first.
///
/// The last layer consumes the target vector directly; a dense layer
/// preceding another dense layer applies the hidden-layer chain rule
/// through its successor's weights and errors, every other pairing
/// consumes the successor's input gradient.
fn backpropagate_stack(layers: &mut [Layer], target: &[f64]) -> Result<(), NetworkError> {
    let last = layers.len() - 1;
    match &mut layers[last] {
        Layer::Dense(layer) => layer.backpropagate(target)?,
        _ => return Err(NetworkError::NonVectorOutput),
    }

    for i in (0..last).rev() {
        let (head, tail) = layers.split_at_mut(i + 1);
        let current = &mut head[i];
        let next = &tail[0];

        match (current, next) {
            (Layer::Dense(current), Layer::Dense(next)) => current.backpropagate_hidden(next)?,
            (Layer::Flatten(current), Layer::Dense(next)) => {
                current.backpropagate(next.input_gradients())?
            }
            (current, next) => match (current, next.input_gradient()) {
                (Layer::Conv(layer), SignalRef::Matrix(gradients)) => {
                    layer.backpropagate(gradients)?
                }
                (Layer::MaxPool(layer), SignalRef::Matrix(gradients)) => {
                    layer.backpropagate(gradients)?
                }
                _ => return Err(NetworkError::IncompatibleLayers),
            },
        }
    }
    Ok(())
}

/// Applies one optimization step per layer. Dense layers use the input
/// they recorded during feedforward; pooling and flatten layers are
/// no-ops kept for contract symmetry.
fn optimize_stack(layers: &mut [Layer], learning_rate: f64) -> Result<(), NetworkError> {
    for layer in layers.iter_mut() {
        match layer {
            Layer::Dense(layer) => {
                let input = layer.input().to_vec();
                layer.optimize(&input, learning_rate)?;
            }
            Layer::Conv(layer) => layer.optimize(learning_rate)?,
            Layer::MaxPool(layer) => layer.optimize(learning_rate)?,
            Layer::Flatten(layer) => layer.optimize(learning_rate)?,
        }
    }
    Ok(())
}

fn last_vector_output(layers: &[Layer]) -> Result<&[f64], NetworkError> {
    match layers.last() {
        Some(layer) => match layer.output() {
            SignalRef::Vector(values) => Ok(values),
            SignalRef::Matrix(_) => Err(NetworkError::NonVectorOutput),
        },
        None => Err(NetworkError::TooFewLayers),
    }
}

fn mean_abs_deviation(prediction: &[f64], reference: &[f64]) -> Result<f64, NetworkError> {
    if prediction.len() != reference.len() {
        return Err(NetworkError::ReferenceMismatch {
            predicted: prediction.len(),
            reference: reference.len(),
        });
    }

    let total: f64 = prediction
        .iter()
        .zip(reference)
        .map(|(p, r)| (p - r).abs())
        .sum();
    Ok(total / prediction.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::SquareMatrix;
    use crate::nn::act_func::ActFunc;
    use crate::nn::layers::conv::ConvLayer;
    use crate::nn::layers::dense::DenseLayer;
    use crate::nn::layers::flatten::FlattenLayer;
    use crate::nn::layers::max_pool::MaxPoolLayer;
    use crate::nn::layers::Signal;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// A 1-node identity layer: one weight of 1.0 and no bias.
    fn identity_dense(rng: &mut StdRng) -> DenseLayer {
        let mut layer = DenseLayer::with_rng(1, 1, ActFunc::None, rng).unwrap();
        layer.set_weights(vec![vec![1.0]]).unwrap();
        layer.set_bias(vec![0.0]).unwrap();
        layer
    }

    #[test]
    fn test_needs_at_least_two_layers() {
        let dataset = Dataset::from_vectors(vec![vec![1.0]], vec![vec![1.0]]);
        let mut rng = seeded(1);
        let layers = vec![Layer::Dense(identity_dense(&mut rng))];

        assert_eq!(
            Network::new(layers, &dataset).unwrap_err(),
            NetworkError::TooFewLayers
        );
    }

    #[test]
    fn test_predict_chains_layer_outputs() {
        let dataset = Dataset::from_vectors(vec![vec![1.0]], vec![vec![1.0]]);
        let mut rng = seeded(2);
        let layers = vec![
            Layer::Dense(identity_dense(&mut rng)),
            Layer::Dense(identity_dense(&mut rng)),
        ];
        let mut network = Network::with_rng(layers, &dataset, seeded(3)).unwrap();

        let prediction = network.predict(SignalRef::Vector(&[4.0])).unwrap();
        assert_eq!(prediction, &[4.0]);
    }

    #[test]
    fn test_accuracy_is_one_for_perfect_predictions() {
        let dataset =
            Dataset::from_vectors(vec![vec![1.0], vec![2.0]], vec![vec![1.0], vec![2.0]]);
        let mut rng = seeded(4);
        let layers = vec![
            Layer::Dense(identity_dense(&mut rng)),
            Layer::Dense(identity_dense(&mut rng)),
        ];
        let mut network = Network::with_rng(layers, &dataset, seeded(5)).unwrap();

        assert_eq!(network.accuracy().unwrap(), 1.0);
    }

    #[test]
    fn test_train_validates_arguments_without_touching_parameters() {
        let dataset = Dataset::from_vectors(vec![vec![1.0]], vec![vec![1.0]]);
        let empty = Dataset::from_vectors(vec![], vec![]);
        let mut rng = seeded(6);
        let layers = vec![
            Layer::Dense(identity_dense(&mut rng)),
            Layer::Dense(identity_dense(&mut rng)),
        ];
        let mut network = Network::with_rng(layers, &dataset, seeded(7)).unwrap();

        assert_eq!(network.train(0, 0.1).unwrap_err(), NetworkError::ZeroEpochs);
        assert_eq!(
            network.train(5, 0.0).unwrap_err(),
            NetworkError::InvalidLearningRate(0.0)
        );
        assert_eq!(
            network.train(5, -1.0).unwrap_err(),
            NetworkError::InvalidLearningRate(-1.0)
        );

        // Parameters must be exactly as constructed.
        for layer in network.layers() {
            match layer {
                Layer::Dense(dense) => {
                    assert_eq!(dense.weights(), &[vec![1.0]]);
                    assert_eq!(dense.bias(), &[0.0]);
                }
                _ => unreachable!(),
            }
        }

        let mut rng = seeded(8);
        let layers = vec![
            Layer::Dense(identity_dense(&mut rng)),
            Layer::Dense(identity_dense(&mut rng)),
        ];
        let mut starving = Network::with_rng(layers, &empty, seeded(9)).unwrap();
        assert_eq!(
            starving.train(5, 0.1).unwrap_err(),
            NetworkError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_average_error_checks_reference_length() {
        let dataset = Dataset::from_vectors(vec![vec![1.0]], vec![vec![1.0]]);
        let mut rng = seeded(10);
        let layers = vec![
            Layer::Dense(identity_dense(&mut rng)),
            Layer::Dense(identity_dense(&mut rng)),
        ];
        let mut network = Network::with_rng(layers, &dataset, seeded(11)).unwrap();

        assert_eq!(
            network
                .average_error(SignalRef::Vector(&[1.0]), &[1.0, 2.0])
                .unwrap_err(),
            NetworkError::ReferenceMismatch {
                predicted: 1,
                reference: 2
            }
        );
        assert_eq!(
            network
                .average_error(SignalRef::Vector(&[1.0]), &[3.0])
                .unwrap(),
            2.0
        );
    }

    #[test]
    fn test_mixed_stack_feedforward_and_training() {
        // conv(4x4, 3x3) -> pool(4 -> 2) -> flatten(2 -> 4) -> dense(1 node)
        let mut rng = seeded(12);
        let layers = vec![
            Layer::Conv(ConvLayer::with_rng(4, 3, ActFunc::Relu, &mut rng).unwrap()),
            Layer::MaxPool(MaxPoolLayer::new(4, 2).unwrap()),
            Layer::Flatten(FlattenLayer::new(2).unwrap()),
            Layer::Dense(DenseLayer::with_rng(1, 4, ActFunc::None, &mut rng).unwrap()),
        ];

        let bright = SquareMatrix::from_vec(4, vec![1.0; 16]);
        let dark = SquareMatrix::zeroed(4);
        let dataset = Dataset::new(
            vec![Signal::from(bright.clone()), Signal::from(dark)],
            vec![vec![1.0], vec![0.0]],
        );

        let mut network = Network::with_rng(layers, &dataset, seeded(13)).unwrap();

        let prediction = network.predict(SignalRef::Matrix(&bright)).unwrap();
        assert_eq!(prediction.len(), 1);

        let accuracy = network.train(50, 0.05).unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn test_matrix_final_layer_is_rejected() {
        let mut rng = seeded(14);
        let layers = vec![
            Layer::Conv(ConvLayer::with_rng(4, 3, ActFunc::Relu, &mut rng).unwrap()),
            Layer::MaxPool(MaxPoolLayer::new(4, 2).unwrap()),
        ];
        let dataset = Dataset::new(
            vec![Signal::from(SquareMatrix::zeroed(4))],
            vec![vec![0.0]],
        );
        let mut network = Network::with_rng(layers, &dataset, seeded(15)).unwrap();

        assert_eq!(
            network
                .predict(SignalRef::Matrix(&SquareMatrix::zeroed(4)))
                .unwrap_err(),
            NetworkError::NonVectorOutput
        );
        assert_eq!(
            network.train(1, 0.1).unwrap_err(),
            NetworkError::NonVectorOutput
        );
    }
}
