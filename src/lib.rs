//! Dense Neural Network Library
//!
//! This library provides the building blocks of a fully connected network
//! trained by gradient descent: layers, activations, losses and optimizers,
//! each with an explicit forward and backward pass over batched `f64` matrices.
//!
//! # Modules
//!
//! - `layers`: Layer trait and implementations (Input, Dense, Dropout)
//! - `activations`: ReLU, Sigmoid, Linear, Softmax and their decision rules
//! - `losses`: Categorical/binary cross-entropy, MSE, MAE, fused Softmax+CCE
//! - `optimizers`: Optimizer trait and implementations (SGD, Adagrad, RMSprop, Adam)
//! - `utils`: Learning-rate schedule shared by the optimizers
//! - `config`: Training configuration structures
//!
//! # Training step
//!
//! Components are composed by the caller; there is no model container.
//!
//! ```
//! use dense_nn::layers::{DenseLayer, Layer};
//! use dense_nn::activations::ReLU;
//! use dense_nn::losses::SoftmaxCrossEntropy;
//! use dense_nn::optimizers::{Optimizer, SGD};
//! use dense_nn::Targets;
//! use ndarray::array;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut dense1 = DenseLayer::new(2, 4, &mut rng);
//! let mut relu = ReLU::new();
//! let mut dense2 = DenseLayer::new(4, 2, &mut rng);
//! let mut loss_activation = SoftmaxCrossEntropy::new();
//! let mut optimizer = SGD::default();
//!
//! let x = array![[1.0, 1.0], [-1.0, -1.0]];
//! let y = Targets::from(array![0usize, 1]);
//!
//! let hidden = relu.forward(&dense1.forward(&x, true)?, true)?;
//! let logits = dense2.forward(&hidden, true)?;
//! let loss = loss_activation.forward(&logits, &y)?;
//! assert!(loss.is_finite());
//!
//! let probabilities = loss_activation.output().unwrap().clone();
//! let dlogits = loss_activation.backward(&probabilities, &y)?;
//! let dhidden = relu.backward(&dense2.backward(&dlogits)?)?;
//! dense1.backward(&dhidden)?;
//!
//! optimizer.pre_update_params();
//! optimizer.update_params(&mut dense1)?;
//! optimizer.update_params(&mut dense2)?;
//! optimizer.post_update_params();
//! assert_eq!(optimizer.iterations(), 1);
//! # Ok::<(), dense_nn::NnError>(())
//! ```

pub mod activations;
pub mod config;
pub mod error;
pub mod layers;
pub mod losses;
pub mod optimizers;
pub mod tensor;
pub mod utils;

pub use error::{NnError, Result};
pub use tensor::{Targets, Tensor};
