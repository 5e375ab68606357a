// Numerical gradient checks using central finite differences.
// Every backward pass is compared with (f(x + h) - f(x - h)) / 2h of a scalar
// objective built from the component's forward pass.

use approx::assert_abs_diff_eq;
use dense_nn::activations::{Linear, ReLU, Sigmoid, Softmax};
use dense_nn::layers::{DenseLayer, Layer, Regularization};
use dense_nn::losses::{
    BinaryCrossEntropy, CategoricalCrossEntropy, Loss, MeanAbsoluteError, MeanSquaredError,
};
use dense_nn::{Targets, Tensor};
use ndarray::array;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;

const STEP: f64 = 1e-6;
const TOLERANCE: f64 = 1e-6;

// ============================================================================
// Helpers
// ============================================================================

fn numerical_gradient(x: &Tensor, mut objective: impl FnMut(&Tensor) -> f64) -> Tensor {
    let mut gradient = Tensor::zeros(x.raw_dim());
    for ((i, j), g) in gradient.indexed_iter_mut() {
        let mut plus = x.clone();
        plus[[i, j]] += STEP;
        let mut minus = x.clone();
        minus[[i, j]] -= STEP;
        *g = (objective(&plus) - objective(&minus)) / (2.0 * STEP);
    }
    gradient
}

fn assert_gradients_match(analytical: &Tensor, numerical: &Tensor) {
    assert_eq!(analytical.dim(), numerical.dim());
    for (a, n) in analytical.iter().zip(numerical.iter()) {
        assert_abs_diff_eq!(*a, *n, epsilon = TOLERANCE);
    }
}

fn random_tensor(rows: usize, cols: usize, low: f64, high: f64, seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    Tensor::random_using((rows, cols), Uniform::new(low, high), &mut rng)
}

/// Scalar objective `Σ output ⊙ upstream`, whose gradient with respect to the
/// output is exactly `upstream`.
fn weighted_sum(output: &Tensor, upstream: &Tensor) -> f64 {
    (output * upstream).sum()
}

/// Checks dL/dinputs of a parameter-free layer.
fn check_layer_inputs<L: Layer>(mut make: impl FnMut() -> L, inputs: &Tensor, upstream: &Tensor) {
    let mut layer = make();
    layer.forward(inputs, true).unwrap();
    let analytical = layer.backward(upstream).unwrap();

    let numerical = numerical_gradient(inputs, |x| {
        let output = make().forward(x, true).unwrap();
        weighted_sum(&output, upstream)
    });
    assert_gradients_match(&analytical, &numerical);
}

/// Checks dL/dpredictions of a loss.
fn check_loss<L: Loss>(loss: &L, predictions: &Tensor, targets: &Targets) {
    let analytical = loss.backward(predictions, targets).unwrap();
    let numerical = numerical_gradient(predictions, |p| loss.calculate(p, targets).unwrap());
    assert_gradients_match(&analytical, &numerical);
}

// ============================================================================
// Dense layer
// ============================================================================

fn dense_objective(
    weights: &Tensor,
    biases: &Tensor,
    reg: Regularization,
    x: &Tensor,
    upstream: &Tensor,
) -> f64 {
    let mut layer = DenseLayer::from_parameters(weights.clone(), biases.clone())
        .unwrap()
        .with_regularization(reg)
        .unwrap();
    let output = layer.forward(x, true).unwrap();
    weighted_sum(&output, upstream) + layer.regularization_loss()
}

fn check_dense(reg: Regularization) {
    let weights = random_tensor(3, 4, -1.0, 1.0, 1);
    let biases = random_tensor(1, 4, -1.0, 1.0, 2);
    let inputs = random_tensor(5, 3, -2.0, 2.0, 3);
    let upstream = random_tensor(5, 4, -1.0, 1.0, 4);

    let mut layer = DenseLayer::from_parameters(weights.clone(), biases.clone())
        .unwrap()
        .with_regularization(reg)
        .unwrap();
    layer.forward(&inputs, true).unwrap();
    let dinputs = layer.backward(&upstream).unwrap();

    let numerical_w =
        numerical_gradient(&weights, |w| dense_objective(w, &biases, reg, &inputs, &upstream));
    let numerical_b =
        numerical_gradient(&biases, |b| dense_objective(&weights, b, reg, &inputs, &upstream));
    let numerical_x =
        numerical_gradient(&inputs, |x| dense_objective(&weights, &biases, reg, x, &upstream));

    assert_gradients_match(layer.dweights().unwrap(), &numerical_w);
    assert_gradients_match(layer.dbiases().unwrap(), &numerical_b);
    assert_gradients_match(&dinputs, &numerical_x);
}

#[test]
fn test_dense_gradients() {
    check_dense(Regularization::default());
}

#[test]
fn test_dense_gradients_with_l2() {
    check_dense(Regularization {
        weight_l2: 5e-2,
        bias_l2: 1e-1,
        ..Regularization::default()
    });
}

#[test]
fn test_dense_gradients_with_l1() {
    // Parameters drawn from [-1, 1] are far enough from zero for |x| to be smooth.
    check_dense(Regularization {
        weight_l1: 5e-2,
        bias_l1: 1e-1,
        ..Regularization::default()
    });
}

// ============================================================================
// Activations
// ============================================================================

#[test]
fn test_relu_gradient() {
    // Stay away from the kink at zero.
    let inputs = array![[-1.5, 0.3, 2.0], [0.7, -0.2, -3.0]];
    let upstream = random_tensor(2, 3, -1.0, 1.0, 5);
    check_layer_inputs(ReLU::new, &inputs, &upstream);
}

#[test]
fn test_sigmoid_gradient() {
    let inputs = random_tensor(4, 3, -4.0, 4.0, 6);
    let upstream = random_tensor(4, 3, -1.0, 1.0, 7);
    check_layer_inputs(Sigmoid::new, &inputs, &upstream);
}

#[test]
fn test_linear_gradient() {
    let inputs = random_tensor(4, 3, -4.0, 4.0, 8);
    let upstream = random_tensor(4, 3, -1.0, 1.0, 9);
    check_layer_inputs(Linear::new, &inputs, &upstream);
}

#[test]
fn test_softmax_gradient() {
    let inputs = random_tensor(4, 5, -3.0, 3.0, 10);
    let upstream = random_tensor(4, 5, -1.0, 1.0, 11);
    check_layer_inputs(Softmax::new, &inputs, &upstream);
}

// ============================================================================
// Losses
// ============================================================================

fn probability_rows(rows: usize, cols: usize, seed: u64) -> Tensor {
    let mut p = random_tensor(rows, cols, 0.1, 1.0, seed);
    for mut row in p.rows_mut() {
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    p
}

#[test]
fn test_categorical_cross_entropy_gradient_sparse() {
    let predictions = probability_rows(4, 3, 12);
    check_loss(
        &CategoricalCrossEntropy::new(),
        &predictions,
        &Targets::from(array![0usize, 2, 1, 2]),
    );
}

#[test]
fn test_categorical_cross_entropy_gradient_one_hot() {
    let predictions = probability_rows(3, 3, 13);
    let targets = array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
    check_loss(&CategoricalCrossEntropy::new(), &predictions, &Targets::from(targets));
}

#[test]
fn test_binary_cross_entropy_gradient() {
    let predictions = random_tensor(4, 2, 0.05, 0.95, 14);
    let targets = array![[1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    check_loss(&BinaryCrossEntropy::new(), &predictions, &Targets::from(targets));
}

#[test]
fn test_mean_squared_error_gradient() {
    let predictions = random_tensor(4, 3, -2.0, 2.0, 15);
    let targets = random_tensor(4, 3, -2.0, 2.0, 16);
    check_loss(&MeanSquaredError::new(), &predictions, &Targets::from(targets));
}

#[test]
fn test_mean_absolute_error_gradient() {
    // Residuals are at least 0.5 away from zero so |r| is differentiable.
    let predictions = array![[0.0, 1.0, -1.0], [2.0, -2.0, 0.5]];
    let targets = array![[1.0, 0.0, 0.5], [1.0, -1.0, -0.5]];
    check_loss(&MeanAbsoluteError::new(), &predictions, &Targets::from(targets));
}

// ============================================================================
// Chained network
// ============================================================================

#[test]
fn test_two_layer_network_input_gradient() {
    let inputs = random_tensor(3, 2, -1.0, 1.0, 17);
    let targets = Targets::from(array![1usize, 0, 1]);
    let mut rng = StdRng::seed_from_u64(18);
    let dense1 = DenseLayer::new(2, 4, &mut rng);
    let dense2 = DenseLayer::new(4, 2, &mut rng);

    let forward_loss = |x: &Tensor| {
        let mut d1 = dense1.clone();
        let mut act = Sigmoid::new();
        let mut d2 = dense2.clone();
        let mut softmax = Softmax::new();
        let h = act.forward(&d1.forward(x, true).unwrap(), true).unwrap();
        let p = softmax.forward(&d2.forward(&h, true).unwrap(), true).unwrap();
        CategoricalCrossEntropy::new().calculate(&p, &targets).unwrap()
    };

    let mut d1 = dense1.clone();
    let mut act = Sigmoid::new();
    let mut d2 = dense2.clone();
    let mut softmax = Softmax::new();
    let loss = CategoricalCrossEntropy::new();
    let h = act.forward(&d1.forward(&inputs, true).unwrap(), true).unwrap();
    let p = softmax.forward(&d2.forward(&h, true).unwrap(), true).unwrap();
    let dp = loss.backward(&p, &targets).unwrap();
    let dz2 = softmax.backward(&dp).unwrap();
    let dh = d2.backward(&dz2).unwrap();
    let dz1 = act.backward(&dh).unwrap();
    let dx = d1.backward(&dz1).unwrap();

    let numerical = numerical_gradient(&inputs, forward_loss);
    assert_gradients_match(&dx, &numerical);
}
