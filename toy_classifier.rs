use std::env;
use std::process::ExitCode;

use dense_nn::activations::{Activation, Predictions};
use dense_nn::config::{load_config, TrainingConfig};
use dense_nn::layers::{DenseLayer, DropoutLayer, Layer};
use dense_nn::losses::SoftmaxCrossEntropy;
use dense_nn::optimizers::Optimizer;
use dense_nn::{NnError, Result, Targets, Tensor};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

// Two Gaussian blobs, one per class.
const NUM_INPUTS: usize = 2;
const NUM_HIDDEN: usize = 16;
const NUM_CLASSES: usize = 2;
const SAMPLES_PER_CLASS: usize = 100;
const BLOB_CENTER: f64 = 1.5;
const BLOB_SPREAD: f64 = 0.5;
// Training hyperparameters.
const EPOCHS: usize = 1_000;
const LOG_EVERY: usize = 100;
const SEED: u64 = 42;

// Network with one hidden layer, optional dropout and a fused softmax output.
struct Network {
    dense1: DenseLayer,
    activation: Box<dyn Activation>,
    dropout: Option<DropoutLayer>,
    dense2: DenseLayer,
    loss_activation: SoftmaxCrossEntropy,
}

fn build_network(config: &TrainingConfig, rng: &mut StdRng) -> Result<Network> {
    Ok(Network {
        dense1: DenseLayer::new(NUM_INPUTS, NUM_HIDDEN, rng)
            .with_regularization(config.regularization)?,
        activation: config.hidden_activation().build(),
        dropout: config.dropout(rng)?,
        dense2: DenseLayer::new(NUM_HIDDEN, NUM_CLASSES, rng)
            .with_regularization(config.regularization)?,
        loss_activation: SoftmaxCrossEntropy::new(),
    })
}

// Class 0 around (+c, +c), class 1 around (-c, -c).
fn make_blobs(rng: &mut StdRng) -> (Tensor, Array1<usize>) {
    let samples = SAMPLES_PER_CLASS * NUM_CLASSES;
    let mut inputs = Array2::zeros((samples, NUM_INPUTS));
    let mut labels = Array1::zeros(samples);

    for (i, mut row) in inputs.rows_mut().into_iter().enumerate() {
        let class = i % NUM_CLASSES;
        let center = if class == 0 { BLOB_CENTER } else { -BLOB_CENTER };
        for value in row.iter_mut() {
            let noise: f64 = rng.sample(StandardNormal);
            *value = center + BLOB_SPREAD * noise;
        }
        labels[i] = class;
    }
    (inputs, labels)
}

fn accuracy(predictions: &Predictions, labels: &Array1<usize>) -> f64 {
    match predictions {
        Predictions::Classes(classes) => {
            let correct = classes.iter().zip(labels.iter()).filter(|(p, y)| p == y).count();
            correct as f64 / labels.len() as f64
        }
        _ => 0.0,
    }
}

// One full pre/update/post step over the whole batch; returns (data loss, regularization loss).
fn train_step(
    nn: &mut Network,
    optimizer: &mut dyn Optimizer,
    inputs: &Tensor,
    targets: &Targets,
) -> Result<(f64, f64)> {
    let hidden = nn.dense1.forward(inputs, true)?;
    let mut hidden = nn.activation.forward(&hidden, true)?;
    if let Some(dropout) = nn.dropout.as_mut() {
        hidden = dropout.forward(&hidden, true)?;
    }
    let logits = nn.dense2.forward(&hidden, true)?;
    let (data_loss, reg_loss) =
        nn.loss_activation
            .forward_with_regularization(&logits, targets, &[&nn.dense1, &nn.dense2])?;

    let probabilities = nn.loss_activation.output().ok_or(NnError::UninitializedState {
        component: "SoftmaxCrossEntropy",
        operation: "backward",
    })?;
    let dlogits = nn.loss_activation.backward(probabilities, targets)?;
    let mut dhidden = nn.dense2.backward(&dlogits)?;
    if let Some(dropout) = nn.dropout.as_mut() {
        dhidden = dropout.backward(&dhidden)?;
    }
    let dhidden = nn.activation.backward(&dhidden)?;
    nn.dense1.backward(&dhidden)?;

    optimizer.pre_update_params();
    optimizer.update_params(&mut nn.dense1)?;
    optimizer.update_params(&mut nn.dense2)?;
    optimizer.post_update_params();

    Ok((data_loss, reg_loss))
}

// Inference pass: dropout is bypassed and the softmax output is decoded to classes.
fn evaluate(nn: &mut Network, inputs: &Tensor, targets: &Targets) -> Result<(f64, Predictions)> {
    let hidden = nn.dense1.forward(inputs, false)?;
    let mut hidden = nn.activation.forward(&hidden, false)?;
    if let Some(dropout) = nn.dropout.as_mut() {
        hidden = dropout.forward(&hidden, false)?;
    }
    let logits = nn.dense2.forward(&hidden, false)?;
    let loss = nn.loss_activation.forward(&logits, targets)?;
    let predictions = nn
        .loss_activation
        .output()
        .map(|probabilities| nn.loss_activation.predictions(probabilities))
        .unwrap_or(Predictions::Classes(Array1::zeros(0)));
    Ok((loss, predictions))
}

fn run(config: TrainingConfig) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let (inputs, labels) = make_blobs(&mut rng);
    let targets = Targets::from(labels.clone());

    let mut nn = build_network(&config, &mut rng)?;
    let mut optimizer = config.optimizer.build()?;
    info!(
        optimizer = config.optimizer.name(),
        activation = %config.hidden_activation(),
        dropout = ?config.dropout_rate,
        samples = inputs.nrows(),
        "training toy classifier"
    );

    for epoch in 0..EPOCHS {
        let (data_loss, reg_loss) = train_step(&mut nn, optimizer.as_mut(), &inputs, &targets)?;
        if (epoch + 1) % LOG_EVERY == 0 {
            let (_, predictions) = evaluate(&mut nn, &inputs, &targets)?;
            info!(
                epoch = epoch + 1,
                data_loss,
                reg_loss,
                accuracy = accuracy(&predictions, &labels),
                learning_rate = optimizer.current_learning_rate(),
                "progress"
            );
        }
    }

    let (loss, predictions) = evaluate(&mut nn, &inputs, &targets)?;
    info!(loss, accuracy = accuracy(&predictions, &labels), "finished");
    Ok(())
}

fn main() -> ExitCode {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Optional path to a JSON training configuration.
    let config = match env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%path, %err, "could not load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => TrainingConfig::default(),
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "training failed");
            ExitCode::FAILURE
        }
    }
}
