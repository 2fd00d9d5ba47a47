use crate::*;

/// Функция активации слоя
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    Sine,
}

impl Activation {
    /// Выход нейрона. `previous_output` нужен рекуррентным функциям,
    /// функции без состояния его игнорируют.
    pub fn activate(&self, input: f64, _previous_output: f64) -> f64 {
        match self {
            Activation::Linear => input,
            Activation::Sigmoid => 1.0 / (1.0 + (-input).exp()),
            Activation::Tanh => input.tanh(),
            Activation::Sine => input.sin(),
        }
    }

    /// Производная, выраженная через вход и уже посчитанный выход
    pub fn derivative(&self, _input: f64, output: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Sigmoid => output * (1.0 - output),
            Activation::Tanh => 1.0 - output * output,
            Activation::Sine => (1.0 - output * output).sqrt(),
        }
    }

    /// Смещение линейного слоя не обучается
    pub fn default_bias_mode(&self) -> BiasMode {
        match self {
            Activation::Linear => BiasMode::Fixed,
            _ => BiasMode::Learnable,
        }
    }

    pub fn default_initializer(&self) -> Option<Initializer> {
        match self {
            Activation::Linear => None,
            _ => Some(Initializer::default()),
        }
    }
}
