//! Графовая нейросеть: слои, нейроны, синапсы и коннекторы в плоских аренах.
//!
//! Обучение с учителем (обратное распространение ошибки: персептрон, частичный LSTM)
//! и без учителя (самоорганизующаяся карта Кохонена).
//!
//! Общие импорты модулей наружу не видны:
//!
//! ```compile_fail
//! use lib_neural_graph::Itertools;
//! ```

pub(crate) use std::ops::Range;

pub(crate) use itertools::{iproduct, Itertools};
pub(crate) use log::{debug, info, trace};
pub(crate) use rand::{Rng, RngCore, SeedableRng};
pub(crate) use rand_chacha::ChaCha8Rng;
pub(crate) use serde::{Deserialize, Serialize};

mod error;
mod activation;
mod layer_topology;
mod neuron;
mod layer;
mod connector;
mod graph;
mod initializer;
mod learning_rate;
mod training;
mod network;
mod teacher;
mod perceptron;
mod lstm;
mod neighborhood;
mod kohonen;
mod som;

pub use error::*;
pub use activation::*;
pub use layer_topology::*;
pub use neuron::*;
pub use layer::*;
pub use connector::*;
pub use graph::*;
pub use initializer::*;
pub use learning_rate::*;
pub use training::*;
pub use network::*;
pub use teacher::*;
pub use perceptron::*;
pub use lstm::*;
pub use neighborhood::*;
pub use kohonen::*;
pub use som::*;

/// Детерминированный генератор случайных чисел для инициализации и шума
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
