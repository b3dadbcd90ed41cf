use rand::rngs::StdRng;
use rand::SeedableRng;

use tinynn::nn::act_func::ActFunc;
use tinynn::nn::dataset::Dataset;
use tinynn::nn::layers::dense::DenseLayer;
use tinynn::nn::layers::{Layer, SignalRef};
use tinynn::nn::network::Network;

fn xor_dataset() -> Dataset {
    Dataset::from_vectors(
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    )
}

/// Builds the reference composition: one hidden layer, one output layer.
fn xor_network(dataset: &Dataset, seed: u64) -> Network<'_> {
    let mut rng = StdRng::seed_from_u64(seed);
    let layers = vec![
        Layer::Dense(DenseLayer::with_rng(3, 2, ActFunc::Tanh, &mut rng).unwrap()),
        Layer::Dense(DenseLayer::with_rng(1, 3, ActFunc::Sigmoid, &mut rng).unwrap()),
    ];
    Network::with_rng(layers, dataset, StdRng::seed_from_u64(seed ^ 0xa5a5)).unwrap()
}

#[test]
fn test_xor_is_learnable() {
    let dataset = xor_dataset();

    // XOR training occasionally lands in a flat region depending on the
    // random start; a handful of restarts makes learnability itself the
    // assertion rather than one lucky seed.
    let mut best_accuracy: f64 = 0.0;
    for seed in 0..5 {
        let mut network = xor_network(&dataset, seed);
        let accuracy = network.train(6_000, 0.5).unwrap();
        best_accuracy = best_accuracy.max(accuracy);

        if best_accuracy >= 0.9 {
            // The trained network must also order its predictions correctly.
            let low = network.predict(SignalRef::Vector(&[0.0, 0.0])).unwrap()[0];
            let high = network.predict(SignalRef::Vector(&[0.0, 1.0])).unwrap()[0];
            assert!(high > low);
            break;
        }
    }

    assert!(
        best_accuracy >= 0.9,
        "expected XOR accuracy >= 0.9, best run reached {best_accuracy}"
    );
}

#[test]
fn test_two_linear_layers_learn_a_scaling() {
    // y = 0.5 x through two identity-activation layers; the composed
    // weights must converge so the product approximates 0.5.
    let inputs: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64 / 8.0]).collect();
    let targets: Vec<Vec<f64>> = (0..8).map(|i| vec![0.5 * i as f64 / 8.0]).collect();
    let dataset = Dataset::from_vectors(inputs, targets);

    let mut rng = StdRng::seed_from_u64(40);
    let layers = vec![
        Layer::Dense(DenseLayer::with_rng(1, 1, ActFunc::None, &mut rng).unwrap()),
        Layer::Dense(DenseLayer::with_rng(1, 1, ActFunc::None, &mut rng).unwrap()),
    ];
    let mut network = Network::with_rng(layers, &dataset, StdRng::seed_from_u64(41)).unwrap();

    let accuracy = network.train(2_000, 0.05).unwrap();
    assert!(accuracy > 0.95, "accuracy was {accuracy}");

    let prediction = network.predict(SignalRef::Vector(&[1.0])).unwrap();
    assert!((prediction[0] - 0.5).abs() < 0.05);
}

#[test]
fn test_training_failure_reports_through_the_public_api() {
    let dataset = xor_dataset();
    let mut network = xor_network(&dataset, 99);

    assert!(network.train(0, 0.5).is_err());
    assert!(network.train(10, -0.5).is_err());

    // The failed calls must not have produced NaN or otherwise poisoned
    // parameters: a normal training run still works afterwards.
    assert!(network.train(10, 0.5).is_ok());
}
