// End-to-end training of a small classifier on two separable blobs.

use dense_nn::activations::{Predictions, ReLU};
use dense_nn::layers::{DenseLayer, Layer, Regularization};
use dense_nn::losses::SoftmaxCrossEntropy;
use dense_nn::optimizers::{Adam, Optimizer, SGD};
use dense_nn::{Targets, Tensor};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

const SAMPLES_PER_CLASS: usize = 50;

fn two_blobs(seed: u64) -> (Tensor, Array1<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = 2 * SAMPLES_PER_CLASS;
    let mut inputs = Array2::zeros((samples, 2));
    let mut labels = Array1::zeros(samples);
    for i in 0..samples {
        let class = i % 2;
        let center = if class == 0 { 1.5 } else { -1.5 };
        for j in 0..2 {
            let noise: f64 = rng.sample(StandardNormal);
            inputs[[i, j]] = center + 0.5 * noise;
        }
        labels[i] = class;
    }
    (inputs, labels)
}

struct Model {
    dense1: DenseLayer,
    relu: ReLU,
    dense2: DenseLayer,
    loss_activation: SoftmaxCrossEntropy,
}

impl Model {
    fn new(seed: u64, regularization: Regularization) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            dense1: DenseLayer::new(2, 4, &mut rng)
                .with_regularization(regularization)
                .unwrap(),
            relu: ReLU::new(),
            dense2: DenseLayer::new(4, 2, &mut rng),
            loss_activation: SoftmaxCrossEntropy::new(),
        }
    }

    /// One pre/update/post step; returns the data loss measured before the update.
    fn train_step(&mut self, optimizer: &mut dyn Optimizer, x: &Tensor, y: &Targets) -> f64 {
        let z1 = self.dense1.forward(x, true).unwrap();
        let h = self.relu.forward(&z1, true).unwrap();
        let z2 = self.dense2.forward(&h, true).unwrap();
        let loss = self.loss_activation.forward(&z2, y).unwrap();

        let probabilities = self.loss_activation.output().unwrap().clone();
        let dz2 = self.loss_activation.backward(&probabilities, y).unwrap();
        let dh = self.dense2.backward(&dz2).unwrap();
        let dz1 = self.relu.backward(&dh).unwrap();
        self.dense1.backward(&dz1).unwrap();

        optimizer.pre_update_params();
        optimizer.update_params(&mut self.dense1).unwrap();
        optimizer.update_params(&mut self.dense2).unwrap();
        optimizer.post_update_params();
        loss
    }

    fn accuracy(&mut self, x: &Tensor, labels: &Array1<usize>) -> f64 {
        let z1 = self.dense1.forward(x, false).unwrap();
        let h = self.relu.forward(&z1, false).unwrap();
        let z2 = self.dense2.forward(&h, false).unwrap();
        self.loss_activation
            .forward(&z2, &Targets::from(labels.clone()))
            .unwrap();

        match self.loss_activation.predictions(self.loss_activation.output().unwrap()) {
            Predictions::Classes(classes) => {
                let correct = classes.iter().zip(labels.iter()).filter(|(p, y)| p == y).count();
                correct as f64 / labels.len() as f64
            }
            other => panic!("softmax produced {:?}", other),
        }
    }
}

#[test]
fn test_sgd_training_on_toy_data() {
    let (x, labels) = two_blobs(0);
    let y = Targets::from(labels.clone());
    let mut model = Model::new(1, Regularization::default());
    let mut optimizer = SGD::new(1.0, 0.0, 0.0).unwrap();

    let losses: Vec<f64> = (0..1000)
        .map(|_| model.train_step(&mut optimizer, &x, &y))
        .collect();

    for window in losses[..10].windows(2) {
        assert!(window[1] < window[0], "loss did not decrease: {:?}", &losses[..10]);
    }
    assert!(losses[999] < losses[0]);
    let accuracy = model.accuracy(&x, &labels);
    assert!(accuracy >= 0.9, "accuracy {}", accuracy);
}

#[test]
fn test_adam_training_with_regularization() {
    let (x, labels) = two_blobs(2);
    let y = Targets::from(labels.clone());
    let regularization = Regularization {
        weight_l2: 5e-4,
        bias_l2: 5e-4,
        ..Regularization::default()
    };
    let mut model = Model::new(3, regularization);
    let mut optimizer = Adam::new(0.05, 5e-7, 1e-7, 0.9, 0.999).unwrap();

    for _ in 0..300 {
        model.train_step(&mut optimizer, &x, &y);
    }

    assert_eq!(optimizer.iterations(), 300);
    assert!(model.dense1.regularization_loss() > 0.0);
    assert!(model.accuracy(&x, &labels) >= 0.9);
}

#[test]
fn test_same_seed_same_training() {
    let (x, labels) = two_blobs(4);
    let y = Targets::from(labels);

    let run = || {
        let mut model = Model::new(5, Regularization::default());
        let mut optimizer = SGD::new(1.0, 1e-3, 0.5).unwrap();
        for _ in 0..20 {
            model.train_step(&mut optimizer, &x, &y);
        }
        (model.dense1.weights().clone(), model.dense2.biases().clone())
    };

    assert_eq!(run(), run());
}
