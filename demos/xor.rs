//! Trains the reference two-layer composition on the XOR truth table and
//! prints the predictions. Run with RUST_LOG=debug for per-epoch progress.

use tinynn::nn::act_func::ActFunc;
use tinynn::nn::dataset::Dataset;
use tinynn::nn::layers::dense::DenseLayer;
use tinynn::nn::layers::{Layer, SignalRef};
use tinynn::nn::network::Network;

fn main() {
    env_logger::init();

    let dataset = Dataset::from_vectors(
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    );

    let layers = vec![
        Layer::Dense(DenseLayer::new(3, 2, ActFunc::Tanh).expect("valid hidden layer shape")),
        Layer::Dense(DenseLayer::new(1, 3, ActFunc::Sigmoid).expect("valid output layer shape")),
    ];

    let mut network = Network::new(layers, &dataset).expect("at least two layers");
    let accuracy = network.train(10_000, 0.5).expect("training should run");
    println!("accuracy after training: {accuracy:.4}");

    for (a, b) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)] {
        let prediction = network
            .predict(SignalRef::Vector(&[a, b]))
            .expect("prediction should run");
        println!("{a} xor {b} -> {:.3}", prediction[0]);
    }
}
